//! The interactive menu: an explicit state machine driven by an outer
//! loop. Every screen is one `State`; a step renders the screen, blocks
//! for one action, mutates the shared `Context`, and names the next
//! state. No handler calls another handler, so the stack stays flat.

use anyhow::Result;

use crate::contact::{Contact, Field};
use crate::pagination::{page_slice, total_pages};
use crate::store::{PhoneBook, StoreError};
use crate::validate;

use super::console::Console;
use super::draw;

const REPORT_SAVED: &str = "Contact saved";
const REPORT_UPDATED: &str = "Contact updated";
const REPORT_REMOVED: &str = "Contact removed";
const REPORT_UNCHANGED: &str = "Nothing changed";
const REPORT_DECLINED: &str = "Empty contact discarded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Numbered selection: a contact on a list screen, a field in the
    /// editor.
    Select(usize),
    Add,
    Find,
    Next,
    Prev,
    Save,
    Cancel,
    Delete,
    Edit,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    MainMenu,
    Detail,
    Create,
    Edit,
    SearchQuery,
    SearchResults,
    Quit,
}

// Static allowed-action tables. Each screen merges the common set with
// its own actions; digit selections are bounded per screen at dispatch.
const COMMON_ACTIONS: &[(&str, Action)] =
    &[("q", Action::Quit), ("h", Action::Help), ("?", Action::Help)];
const MAIN_ACTIONS: &[(&str, Action)] = &[
    ("a", Action::Add),
    ("s", Action::Find),
    ("n", Action::Next),
    ("p", Action::Prev),
];
const DETAIL_ACTIONS: &[(&str, Action)] = &[("e", Action::Edit), ("c", Action::Cancel)];
const CREATE_ACTIONS: &[(&str, Action)] = &[("s", Action::Save), ("c", Action::Cancel)];
const EDIT_ACTIONS: &[(&str, Action)] = &[
    ("s", Action::Save),
    ("d", Action::Delete),
    ("c", Action::Cancel),
];
const RESULTS_ACTIONS: &[(&str, Action)] = &[
    ("s", Action::Find),
    ("c", Action::Cancel),
    ("n", Action::Next),
    ("p", Action::Prev),
];

const MAIN_HELP: &str = "\
The following options are available:
- number: select a contact from the list;
- a: add a new contact;
- n: next page of contacts;
- p: previous page of contacts;
- s: search contacts;
- h: show this help;
- q: quit the application.";

const EDITOR_HELP: &str = "\
The following options are available:
- number from 1 to 6: select a field to fill in;
- s: save the contact (shown once any field is set);
- d: delete the contact (when editing a stored one);
- c: cancel and discard unsaved changes;
- h: show this help;
- q: quit the application.";

const DETAIL_HELP: &str = "\
The following options are available:
- e: edit this contact;
- c: go back to the list;
- h: show this help;
- q: quit the application.";

const RESULTS_HELP: &str = "\
The following options are available:
- number: select a contact from the results;
- s: enter a new search string;
- n: next page of results;
- p: previous page of results;
- c: cancel the search and go back;
- h: show this help;
- q: quit the application.";

/// The single mutable state bag threaded through every screen.
pub struct Context {
    /// In-memory cache of the store; resynchronized explicitly after
    /// every persistence mutation.
    pub contacts: Vec<Contact>,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    /// Working copy of the focused contact.
    pub current: Contact,
    /// The contact as it was before the current edit session started;
    /// cancel restores it.
    pub snapshot: Option<Contact>,
    pub query: Option<String>,
    /// Search hits, cached across pagination within one query.
    pub results: Option<Vec<Contact>>,
    /// Outcome of the last commit, shown once on the main menu.
    pub report: Option<String>,
    /// Whether Detail was entered from the search results.
    pub from_search: bool,
}

impl Context {
    pub fn new(contacts: Vec<Contact>, per_page: usize) -> Self {
        let total = total_pages(contacts.len(), per_page);
        Self {
            contacts,
            page: 1,
            per_page,
            total_pages: total,
            current: Contact::default(),
            snapshot: None,
            query: None,
            results: None,
            report: None,
            from_search: false,
        }
    }

    /// Point pagination back at the full collection.
    pub fn reset_pagination(&mut self) {
        self.page = 1;
        self.total_pages = total_pages(self.contacts.len(), self.per_page);
    }

    /// Move one page forward or back, clamped to [1, total_pages].
    pub fn change_page(&mut self, forward: bool) {
        if forward && self.page < self.total_pages {
            self.page += 1;
        }
        if !forward && self.page > 1 {
            self.page -= 1;
        }
    }

    /// Apply one field entry to the working copy. Whitespace-only input
    /// is a no-op; the first real change of an edit session records the
    /// pre-edit snapshot so cancel can restore it. Mutation goes through
    /// an explicit clone, never in place.
    pub fn apply_field_edit(&mut self, field: Field, value: String, keep_snapshot: bool) {
        if !value.is_empty() && value.trim().is_empty() {
            return;
        }
        if keep_snapshot && self.snapshot.is_none() {
            self.snapshot = Some(self.current.clone());
        }
        let mut edited = self.current.clone();
        edited.set(field, value);
        self.current = edited;
    }

    /// Persist the working copy as a new record, unless an equal contact
    /// already exists in the collection.
    pub fn commit_create(&mut self, book: &PhoneBook) -> Result<()> {
        if self.current.is_empty() {
            self.finish(REPORT_DECLINED);
            return Ok(());
        }
        if self.contacts.iter().any(|c| c == &self.current) {
            self.finish(REPORT_UNCHANGED);
            return Ok(());
        }
        let mut contact = self.current.clone();
        book.save(&mut contact, true)?;
        self.contacts.push(contact);
        self.finish(REPORT_SAVED);
        Ok(())
    }

    /// Persist an edit session. Without a snapshot nothing changed; a
    /// missing record surfaces the not-found condition as a report and
    /// leaves the cache alone.
    pub fn commit_update(&mut self, book: &PhoneBook) -> Result<()> {
        let old = match self.snapshot.clone() {
            Some(old) => old,
            None => {
                self.finish(REPORT_UNCHANGED);
                return Ok(());
            }
        };
        if self.current.is_empty() {
            self.finish(REPORT_DECLINED);
            return Ok(());
        }

        let mut contact = self.current.clone();
        match book.update(&mut contact) {
            Ok(()) => {
                self.contacts.retain(|c| c.id != old.id);
                self.contacts.push(contact);
                self.finish(REPORT_UPDATED);
                Ok(())
            }
            Err(err) if err.downcast_ref::<StoreError>().is_some() => {
                self.finish(&err.to_string());
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Remove the focused record. The snapshot names the stored version
    /// when the working copy has unsaved edits.
    pub fn commit_remove(&mut self, book: &PhoneBook) -> Result<()> {
        let target = self.snapshot.clone().unwrap_or_else(|| self.current.clone());
        match target.id.clone() {
            Some(id) => {
                book.remove(&id, true)?;
                self.contacts.retain(|c| c.id.as_deref() != Some(id.as_str()));
                self.finish(REPORT_REMOVED);
            }
            None => self.finish(REPORT_UNCHANGED),
        }
        Ok(())
    }

    /// Reset navigation state after a commit: back to page one of the
    /// full collection, with the outcome queued for the main menu.
    fn finish(&mut self, report: &str) {
        self.current = Contact::default();
        self.snapshot = None;
        self.query = None;
        self.results = None;
        self.from_search = false;
        self.report = Some(report.to_string());
        self.reset_pagination();
    }
}

pub struct App<'a> {
    book: &'a PhoneBook,
    console: Console,
    ctx: Context,
}

impl<'a> App<'a> {
    pub fn new(book: &'a PhoneBook, per_page: usize) -> Result<Self> {
        let contacts = book.load_all()?;
        Ok(Self {
            book,
            console: Console::new(),
            ctx: Context::new(contacts, per_page),
        })
    }

    /// Drive the state machine until Quit. The loop owns the current
    /// state; steps return the next one instead of calling each other.
    pub fn run(&mut self) -> Result<()> {
        let mut state = State::MainMenu;
        loop {
            state = match state {
                State::MainMenu => self.main_menu()?,
                State::Detail => self.detail()?,
                State::Create => self.editor(State::Create)?,
                State::Edit => self.editor(State::Edit)?,
                State::SearchQuery => self.search_query()?,
                State::SearchResults => self.search_results()?,
                State::Quit => {
                    self.console.clear()?;
                    return Ok(());
                }
            };
        }
    }

    fn main_menu(&mut self) -> Result<State> {
        self.console.clear()?;

        let slice = page_slice(
            &self.ctx.contacts,
            self.ctx.page,
            self.ctx.per_page,
            self.ctx.total_pages,
        )
        .to_vec();

        let body = draw::contact_list(&slice, self.ctx.page, self.ctx.total_pages, "No Contacts");
        let buttons = draw::list_buttons(
            self.ctx.page,
            self.ctx.total_pages,
            slice.len(),
            &["[a] add", "[s] find", "[q] quit"],
        );
        draw::window(&mut self.console, "Contacts", &body, &buttons)?;

        if let Some(report) = self.ctx.report.take() {
            self.console.write(report)?;
        }

        let mut options = Vec::from(COMMON_ACTIONS);
        options.extend_from_slice(MAIN_ACTIONS);
        let action = self.request_action(&options, slice.len())?;

        Ok(match action {
            Action::Select(n) => {
                self.ctx.current = slice[n - 1].clone();
                self.ctx.snapshot = None;
                self.ctx.from_search = false;
                State::Detail
            }
            Action::Add => {
                self.ctx.current = Contact::default();
                self.ctx.snapshot = None;
                State::Create
            }
            Action::Find => {
                self.ctx.page = 1;
                State::SearchQuery
            }
            Action::Next => {
                self.ctx.change_page(true);
                State::MainMenu
            }
            Action::Prev => {
                self.ctx.change_page(false);
                State::MainMenu
            }
            Action::Help => {
                self.show_help(MAIN_HELP)?;
                State::MainMenu
            }
            Action::Quit => State::Quit,
            _ => State::MainMenu,
        })
    }

    /// Unified create/edit screen; `state` decides the title, the delete
    /// action, and where cancel lands.
    fn editor(&mut self, state: State) -> Result<State> {
        self.console.clear()?;
        let editing = state == State::Edit;

        let body = draw::field_list(&self.ctx.current);
        let buttons = draw::editor_buttons(&self.ctx.current, editing);
        let title = if editing { "Edit Contact" } else { "New Contact" };
        draw::window(&mut self.console, title, &body, &buttons)?;

        let mut options = Vec::from(COMMON_ACTIONS);
        options.extend_from_slice(if editing { EDIT_ACTIONS } else { CREATE_ACTIONS });
        if self.ctx.current.is_empty() {
            options.retain(|(_, a)| *a != Action::Save);
        }
        let action = self.request_action(&options, Field::COUNT)?;

        Ok(match action {
            Action::Select(n) => {
                // Bounded by Field::COUNT at dispatch
                let field = Field::from_digit(n).unwrap_or(Field::FirstName);
                let mut value = self.console.read("Enter value: ")?;
                if field.is_phone() {
                    while !validate::phone_number(&value) {
                        self.console.write("[Err] Invalid phone number")?;
                        value = self.console.read("Enter value: ")?;
                    }
                }
                self.ctx.apply_field_edit(field, value, editing);
                state
            }
            Action::Save => {
                if editing {
                    self.ctx.commit_update(self.book)?;
                } else {
                    self.ctx.commit_create(self.book)?;
                }
                State::MainMenu
            }
            Action::Delete if editing => {
                self.ctx.commit_remove(self.book)?;
                State::MainMenu
            }
            Action::Cancel => {
                if editing {
                    if let Some(old) = self.ctx.snapshot.take() {
                        self.ctx.current = old;
                    }
                    State::Detail
                } else {
                    self.ctx.current = Contact::default();
                    State::MainMenu
                }
            }
            Action::Help => {
                self.show_help(EDITOR_HELP)?;
                state
            }
            Action::Quit => State::Quit,
            _ => state,
        })
    }

    fn detail(&mut self) -> Result<State> {
        self.console.clear()?;

        let body = self.ctx.current.card_view();
        let buttons = vec!["[e] edit".to_string(), "[c] cancel".to_string()];
        draw::window(&mut self.console, "Contact detail", &body, &buttons)?;

        let mut options = Vec::from(COMMON_ACTIONS);
        options.extend_from_slice(DETAIL_ACTIONS);
        let action = self.request_action(&options, 0)?;

        Ok(match action {
            Action::Edit => {
                self.ctx.snapshot = None;
                State::Edit
            }
            Action::Cancel => {
                self.ctx.current = Contact::default();
                self.ctx.snapshot = None;
                if self.ctx.from_search {
                    State::SearchResults
                } else {
                    State::MainMenu
                }
            }
            Action::Help => {
                self.show_help(DETAIL_HELP)?;
                State::Detail
            }
            Action::Quit => State::Quit,
            _ => State::Detail,
        })
    }

    fn search_query(&mut self) -> Result<State> {
        self.console.clear()?;

        let input = self.console.read("Enter a search string: ")?;
        if input.trim().is_empty() {
            self.ctx.query = None;
            self.ctx.results = None;
            self.ctx.reset_pagination();
            return Ok(State::MainMenu);
        }

        self.ctx.query = Some(input);
        self.ctx.results = None;
        self.ctx.page = 1;
        Ok(State::SearchResults)
    }

    fn search_results(&mut self) -> Result<State> {
        self.console.clear()?;

        let query = self.ctx.query.clone().unwrap_or_default();
        if self.ctx.results.is_none() {
            self.ctx.results = Some(self.book.find_all(&query)?);
        }
        let results = self.ctx.results.clone().unwrap_or_default();
        self.ctx.total_pages = total_pages(results.len(), self.ctx.per_page);

        let slice = page_slice(
            &results,
            self.ctx.page,
            self.ctx.per_page,
            self.ctx.total_pages,
        )
        .to_vec();

        let body = draw::contact_list(&slice, self.ctx.page, self.ctx.total_pages, "No Results");
        let buttons = draw::list_buttons(
            self.ctx.page,
            self.ctx.total_pages,
            slice.len(),
            &["[s] find", "[c] cancel", "[q] quit"],
        );
        draw::window(&mut self.console, "Search", &body, &buttons)?;
        if results.is_empty() {
            self.console.write(format!("Search string: {query}"))?;
        }

        let mut options = Vec::from(COMMON_ACTIONS);
        options.extend_from_slice(RESULTS_ACTIONS);
        let action = self.request_action(&options, slice.len())?;

        Ok(match action {
            Action::Select(n) => {
                self.ctx.current = slice[n - 1].clone();
                self.ctx.snapshot = None;
                self.ctx.from_search = true;
                State::Detail
            }
            Action::Find => {
                self.ctx.query = None;
                self.ctx.results = None;
                self.ctx.page = 1;
                State::SearchQuery
            }
            Action::Cancel => {
                self.ctx.query = None;
                self.ctx.results = None;
                self.ctx.reset_pagination();
                State::MainMenu
            }
            Action::Next => {
                self.ctx.change_page(true);
                State::SearchResults
            }
            Action::Prev => {
                self.ctx.change_page(false);
                State::SearchResults
            }
            Action::Help => {
                self.show_help(RESULTS_HELP)?;
                State::SearchResults
            }
            Action::Quit => State::Quit,
            _ => State::SearchResults,
        })
    }

    /// One line of input resolved against the allowed set, re-prompting
    /// indefinitely on anything unrecognized. Digits up to `max_select`
    /// become numbered selections.
    fn request_action(&mut self, options: &[(&str, Action)], max_select: usize) -> Result<Action> {
        loop {
            let input = self.console.read("Select an option: ")?;
            let code = input.trim().to_lowercase();
            if let Ok(n) = code.parse::<usize>() {
                if (1..=max_select).contains(&n) {
                    return Ok(Action::Select(n));
                }
            }
            if let Some((_, action)) = options.iter().find(|(key, _)| *key == code) {
                return Ok(*action);
            }
            self.console
                .write(format!("Unknown option {input:?}, try again."))?;
        }
    }

    fn show_help(&mut self, text: &str) -> Result<()> {
        self.console.clear()?;
        draw::window(&mut self.console, "Help Info", text, &[])?;
        self.console.pause()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn contact(fields: &[(Field, &str)]) -> Contact {
        let mut c = Contact::default();
        for &(f, v) in fields {
            c.set(f, v);
        }
        c
    }

    fn test_book(tmp: &TempDir) -> PhoneBook {
        let config = Config {
            config_path: PathBuf::new(),
            store_dir: tmp.path().join("db"),
            mirror_dir: tmp.path().join("export"),
            page_size: 10,
        };
        config.init_dirs().unwrap();
        PhoneBook::new(config)
    }

    #[test]
    fn change_page_clamps_at_boundaries() {
        let contacts: Vec<Contact> = (0..25)
            .map(|i| {
                let name = format!("c{i}");
                contact(&[(Field::FirstName, name.as_str())])
            })
            .collect();
        let mut ctx = Context::new(contacts, 10);
        assert_eq!(ctx.total_pages, 3);

        ctx.change_page(false);
        assert_eq!(ctx.page, 1);
        ctx.change_page(true);
        ctx.change_page(true);
        ctx.change_page(true);
        assert_eq!(ctx.page, 3);
    }

    #[test]
    fn whitespace_only_entry_is_a_no_op() {
        let mut ctx = Context::new(Vec::new(), 10);
        ctx.current = contact(&[(Field::FirstName, "Ann")]);
        ctx.apply_field_edit(Field::FirstName, "   ".to_string(), true);
        assert_eq!(ctx.current.first_name.as_deref(), Some("Ann"));
        assert!(ctx.snapshot.is_none());
    }

    #[test]
    fn snapshot_survives_multiple_edits_for_cancel() {
        let mut ctx = Context::new(Vec::new(), 10);
        ctx.current = contact(&[(Field::FirstName, "Ann"), (Field::Company, "Acme")]);
        let before = ctx.current.clone();

        ctx.apply_field_edit(Field::FirstName, "Bea".to_string(), true);
        ctx.apply_field_edit(Field::Company, "Globex".to_string(), true);
        ctx.apply_field_edit(Field::Mobile, "555-0101".to_string(), true);

        let restored = ctx.snapshot.take().unwrap();
        assert_eq!(restored.first_name, before.first_name);
        assert_eq!(restored.company, before.company);
        assert!(restored.mobile.is_none());
    }

    #[test]
    fn commit_create_saves_and_resyncs_cache() {
        let tmp = TempDir::new().unwrap();
        let book = test_book(&tmp);
        let mut ctx = Context::new(Vec::new(), 10);
        ctx.current = contact(&[(Field::FirstName, "Ann")]);

        ctx.commit_create(&book).unwrap();
        assert_eq!(ctx.contacts.len(), 1);
        assert_eq!(ctx.contacts[0].id.as_deref(), Some("ann"));
        assert_eq!(ctx.report.as_deref(), Some(REPORT_SAVED));
        assert!(ctx.current.is_empty());
        assert_eq!(book.load_all().unwrap().len(), 1);
    }

    #[test]
    fn commit_create_declines_empty_and_skips_duplicates() {
        let tmp = TempDir::new().unwrap();
        let book = test_book(&tmp);
        let mut ctx = Context::new(Vec::new(), 10);

        ctx.commit_create(&book).unwrap();
        assert_eq!(ctx.report.as_deref(), Some(REPORT_DECLINED));

        let mut stored = contact(&[(Field::FirstName, "Ann")]);
        book.save(&mut stored, true).unwrap();
        ctx.contacts = vec![stored];
        ctx.current = contact(&[(Field::FirstName, "ANN")]);
        ctx.commit_create(&book).unwrap();
        assert_eq!(ctx.report.as_deref(), Some(REPORT_UNCHANGED));
        assert_eq!(book.load_all().unwrap().len(), 1);
    }

    #[test]
    fn commit_update_rekeys_and_replaces_cache_entry() {
        let tmp = TempDir::new().unwrap();
        let book = test_book(&tmp);

        let mut stored = contact(&[(Field::FirstName, "Ann")]);
        book.save(&mut stored, true).unwrap();

        let mut ctx = Context::new(vec![stored.clone()], 10);
        ctx.current = stored.clone();
        ctx.apply_field_edit(Field::LastName, "Lee".to_string(), true);

        ctx.commit_update(&book).unwrap();
        assert_eq!(ctx.report.as_deref(), Some(REPORT_UPDATED));
        assert_eq!(ctx.contacts.len(), 1);
        assert_eq!(ctx.contacts[0].id.as_deref(), Some("annlee"));
        assert!(book.load("ann").unwrap().is_none());
    }

    #[test]
    fn commit_update_without_changes_reports_unchanged() {
        let tmp = TempDir::new().unwrap();
        let book = test_book(&tmp);
        let mut ctx = Context::new(Vec::new(), 10);
        ctx.current = contact(&[(Field::FirstName, "Ann")]);

        ctx.commit_update(&book).unwrap();
        assert_eq!(ctx.report.as_deref(), Some(REPORT_UNCHANGED));
        assert!(book.load_all().unwrap().is_empty());
    }

    #[test]
    fn commit_update_surfaces_not_found_without_cache_corruption() {
        let tmp = TempDir::new().unwrap();
        let book = test_book(&tmp);

        let mut ghost = contact(&[(Field::FirstName, "Zoe")]);
        ghost.id = Some("ghost".into());
        let mut ctx = Context::new(vec![ghost.clone()], 10);
        ctx.current = ghost.clone();
        ctx.snapshot = Some(ghost);
        ctx.apply_field_edit(Field::LastName, "Lee".to_string(), true);

        ctx.commit_update(&book).unwrap();
        let report = ctx.report.clone().unwrap();
        assert!(report.contains("does not exist"), "unexpected report {report:?}");
        assert_eq!(ctx.contacts.len(), 1);
    }

    #[test]
    fn commit_remove_deletes_store_and_cache() {
        let tmp = TempDir::new().unwrap();
        let book = test_book(&tmp);

        let mut stored = contact(&[(Field::FirstName, "Ann")]);
        book.save(&mut stored, true).unwrap();

        let mut ctx = Context::new(vec![stored.clone()], 10);
        ctx.current = stored;
        ctx.commit_remove(&book).unwrap();

        assert_eq!(ctx.report.as_deref(), Some(REPORT_REMOVED));
        assert!(ctx.contacts.is_empty());
        assert!(book.load_all().unwrap().is_empty());
    }
}
