//! Headless presenter for the grid + editor screen.
//!
//! # Responsibility
//! - Track route, selection and form state for one screen instance.
//! - Drive the record endpoint the way the screen does: load on navigation,
//!   save full copies, discard edits on conflict.
//! - Queue user-facing notifications for the UI shell to display.
//!
//! # Invariants
//! - Navigating to a missing record never fails; it lands on the list route.
//! - A failed or conflicting save never leaves a half-written record behind.

use crate::api::EndpointError;
use crate::endpoint::{DataEndpoint, EndpointResult};
use log::debug;
use ringlog_core::{Data, DataForm, DataId, FormValidationError, Page, PageRequest};

pub const SAVED_NOTIFICATION: &str = "Data updated";
pub const CONFLICT_NOTIFICATION: &str =
    "Error updating the data. Somebody else has updated the record while you were making changes.";
pub const INVALID_FORM_NOTIFICATION: &str =
    "Failed to update the data. Check again that all values are valid";

const EDIT_ACTION: &str = "edit";

/// Screen route: the bare list, or the list with one record in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    Edit(DataId),
}

impl Route {
    /// Parses `/{id}` or `/{id}/edit`; everything else falls back to `List`.
    pub fn parse(path: &str) -> Self {
        let mut segments = path.trim().trim_matches('/').split('/');
        let id = match segments.next() {
            Some(segment) if !segment.is_empty() => segment.parse::<DataId>().ok(),
            _ => None,
        };
        let action = segments.next();
        match (id, action, segments.next()) {
            (Some(id), None | Some(EDIT_ACTION), None) => Self::Edit(id),
            _ => Self::List,
        }
    }

    pub fn path(self) -> String {
        match self {
            Self::List => String::new(),
            Self::Edit(id) => format!("/{id}/{EDIT_ACTION}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Result of pressing "save".
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Data),
    Conflict,
    Invalid(FormValidationError),
    Failed(EndpointError),
}

/// State of one grid + editor screen.
pub struct EditorPresenter<'e> {
    endpoint: &'e DataEndpoint,
    route: Route,
    current: Option<Data>,
    form: DataForm,
    notifications: Vec<Notification>,
    grid_refreshes: u64,
}

impl<'e> EditorPresenter<'e> {
    pub fn new(endpoint: &'e DataEndpoint) -> Self {
        Self {
            endpoint,
            route: Route::List,
            current: None,
            form: DataForm::new(),
            notifications: Vec::new(),
            grid_refreshes: 0,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Record loaded into the editor, if any.
    pub fn current(&self) -> Option<&Data> {
        self.current.as_ref()
    }

    pub fn form(&self) -> &DataForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut DataForm {
        &mut self.form
    }

    /// Number of times the grid was asked to reload.
    pub fn grid_refreshes(&self) -> u64 {
        self.grid_refreshes
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Loads one grid page.
    pub fn grid_page(&self, request: &PageRequest) -> EndpointResult<Page<Data>> {
        self.endpoint.list(request)
    }

    /// Handles navigation to `path` and returns the route actually shown.
    pub fn enter(&mut self, path: &str) -> Route {
        let Route::Edit(id) = Route::parse(path) else {
            self.route = Route::List;
            return self.route;
        };

        match self.endpoint.get(id) {
            Ok(Some(data)) => {
                self.populate(Some(data));
                self.route = Route::Edit(id);
            }
            Ok(None) => {
                self.notify(
                    NotificationKind::Info,
                    format!("The requested data was not found, ID = {id}"),
                );
                self.clear_form();
                self.refresh_grid();
                self.route = Route::List;
            }
            Err(err) => {
                self.notify(NotificationKind::Error, err.to_string());
                self.clear_form();
                self.route = Route::List;
            }
        }
        debug!("event=editor_enter module=editor status=ok route={}", self.route.path());
        self.route
    }

    /// Handles a grid selection change.
    pub fn select(&mut self, id: Option<DataId>) -> Route {
        match id {
            Some(id) => self.enter(&Route::Edit(id).path()),
            None => {
                self.clear_form();
                self.route = Route::List;
                self.route
            }
        }
    }

    /// Writes the form into a full record copy and saves it.
    pub fn save(&mut self) -> SaveOutcome {
        let mut data = self.current.clone().unwrap_or_default();
        if let Err(err) = self.form.write_into(&mut data) {
            self.notify(NotificationKind::Error, INVALID_FORM_NOTIFICATION);
            return SaveOutcome::Invalid(err);
        }

        match self.endpoint.update(&data) {
            Ok(saved) => {
                self.clear_form();
                self.refresh_grid();
                self.notify(NotificationKind::Info, SAVED_NOTIFICATION);
                self.route = Route::List;
                SaveOutcome::Saved(saved)
            }
            Err(EndpointError::Conflict) => {
                self.notify(NotificationKind::Error, CONFLICT_NOTIFICATION);
                self.clear_form();
                self.refresh_grid();
                self.route = Route::List;
                SaveOutcome::Conflict
            }
            Err(err) => {
                self.notify(NotificationKind::Error, err.to_string());
                SaveOutcome::Failed(err)
            }
        }
    }

    /// Drops pending edits and reloads the grid.
    pub fn cancel(&mut self) {
        self.clear_form();
        self.refresh_grid();
    }

    fn populate(&mut self, data: Option<Data>) {
        self.form.read(data.as_ref());
        self.current = data;
    }

    fn clear_form(&mut self) {
        self.populate(None);
    }

    fn refresh_grid(&mut self) {
        self.grid_refreshes += 1;
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.push(Notification {
            kind,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EditorPresenter, NotificationKind, Route, SaveOutcome, CONFLICT_NOTIFICATION,
        INVALID_FORM_NOTIFICATION, SAVED_NOTIFICATION,
    };
    use crate::endpoint::DataEndpoint;
    use ringlog_core::{Data, FormField, PageRequest};

    fn endpoint() -> (tempfile::TempDir, DataEndpoint) {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = DataEndpoint::new(dir.path().join("editor.db"));
        (dir, endpoint)
    }

    #[test]
    fn route_parsing_falls_back_to_list() {
        assert_eq!(Route::parse(""), Route::List);
        assert_eq!(Route::parse("/"), Route::List);
        assert_eq!(Route::parse("/7"), Route::Edit(7));
        assert_eq!(Route::parse("/7/edit"), Route::Edit(7));
        assert_eq!(Route::parse("/7/delete"), Route::List);
        assert_eq!(Route::parse("/abc/edit"), Route::List);
        assert_eq!(Route::Edit(7).path(), "/7/edit");
    }

    #[test]
    fn new_record_is_saved_from_blank_form() {
        let (_dir, endpoint) = endpoint();
        let mut presenter = EditorPresenter::new(&endpoint);

        presenter.form_mut().set(FormField::Date, "2024-01-01");
        presenter.form_mut().set(FormField::Steps, "4");
        let outcome = presenter.save();

        let SaveOutcome::Saved(saved) = outcome else {
            panic!("expected save, got {outcome:?}");
        };
        assert_eq!((saved.id, saved.version, saved.steps), (Some(1), 0, Some(4)));
        assert!(presenter.form().is_blank());
        assert_eq!(presenter.grid_refreshes(), 1);
        let notes = presenter.take_notifications();
        assert_eq!(notes[0].message, SAVED_NOTIFICATION);
        let grid = presenter
            .grid_page(&PageRequest::of(0, 10).unwrap())
            .unwrap();
        assert_eq!(grid.total_elements, 1);
    }

    #[test]
    fn selecting_missing_record_redirects_to_list() {
        let (_dir, endpoint) = endpoint();
        let mut presenter = EditorPresenter::new(&endpoint);

        assert_eq!(presenter.enter("/42/edit"), Route::List);
        let notes = presenter.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, "The requested data was not found, ID = 42");
        assert_eq!(presenter.grid_refreshes(), 1);
        assert!(presenter.current().is_none());
    }

    #[test]
    fn edit_existing_then_conflict_discards_local_edits() {
        let (_dir, endpoint) = endpoint();
        let created = endpoint.update(&Data::new()).unwrap();
        let id = created.id.unwrap();

        let mut presenter = EditorPresenter::new(&endpoint);
        assert_eq!(presenter.select(Some(id)), Route::Edit(id));
        assert_eq!(presenter.current(), Some(&created));

        // another caller saves first
        let mut other = created.clone();
        other.moves = Some(99);
        endpoint.update(&other).unwrap();

        presenter.form_mut().set(FormField::Moves, "10");
        assert_eq!(presenter.save(), SaveOutcome::Conflict);
        assert_eq!(presenter.route(), Route::List);
        assert!(presenter.current().is_none());
        assert!(presenter.form().is_blank());

        let notes = presenter.take_notifications();
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert_eq!(notes[0].message, CONFLICT_NOTIFICATION);
        assert_eq!(endpoint.get(id).unwrap().unwrap().moves, Some(99));
    }

    #[test]
    fn invalid_input_keeps_form_and_reports() {
        let (_dir, endpoint) = endpoint();
        let mut presenter = EditorPresenter::new(&endpoint);

        presenter.form_mut().set(FormField::Calories, "lots");
        let outcome = presenter.save();
        assert!(matches!(outcome, SaveOutcome::Invalid(_)));
        assert_eq!(presenter.form().value(FormField::Calories), "lots");
        assert_eq!(
            presenter.take_notifications()[0].message,
            INVALID_FORM_NOTIFICATION
        );
        assert_eq!(endpoint.count().unwrap(), 0);
    }

    #[test]
    fn cancel_and_deselect_clear_the_form() {
        let (_dir, endpoint) = endpoint();
        let created = endpoint.update(&Data::new()).unwrap();
        let mut presenter = EditorPresenter::new(&endpoint);

        presenter.select(created.id);
        presenter.form_mut().set(FormField::Stand, "12");
        presenter.cancel();
        assert!(presenter.form().is_blank());
        assert!(presenter.current().is_none());

        presenter.select(created.id);
        assert_eq!(presenter.select(None), Route::List);
        assert!(presenter.current().is_none());
    }
}
