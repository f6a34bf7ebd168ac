use tracing::debug;

use crate::app::{Action, Location, Transition};
use crate::roster::Actor;
use crate::store::{Record, RecordId, RecordStore, SaveMode, StoreError};
use crate::ui::console::Console;
use crate::ui::table::{self, Page};

/// What a record screen needs from the store it manages.
///
/// One generic handler drives the user and question screens through this
/// trait; each implementation supplies rendering and the multi-step edits.
pub trait Manager {
    type Item: Record;

    fn store(&self) -> &RecordStore<Self::Item>;

    fn store_mut(&mut self) -> &mut RecordStore<Self::Item>;

    fn width(&self) -> usize;

    /// The current page as shown for `location`.
    fn page(&self, location: Location) -> Page;

    fn handle_add(&mut self, console: &mut dyn Console) -> Result<(), StoreError>;

    fn handle_edit(&mut self, console: &mut dyn Console) -> Result<(), StoreError>;

    fn handle_delete(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        console.pause("Records cannot be deleted here. Press enter to continue.")?;
        Ok(())
    }

    fn handle_toggle(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        console.pause("There is nothing to enable or disable here. Press enter to continue.")?;
        Ok(())
    }
}

/// Action keys accepted on the view of each record screen.
pub fn allowed_keys(location: Location) -> &'static str {
    match location {
        Location::UserManager => "AEDSQNPLF",
        Location::QuestionManager => "AEXSQNPLF",
        Location::Statistics => "QNPLF",
        _ => "Q",
    }
}

fn view_footer(location: Location) -> &'static str {
    match location {
        Location::UserManager => "A - Add | E - Edit | D - Delete | S - Save changes | Q - Quit",
        Location::QuestionManager => {
            "A - Add | E - Edit | X - Enable/disable | S - Save changes | Q - Quit"
        }
        _ => "Q - Quit",
    }
}

fn action_footer(action: Action) -> &'static str {
    match action {
        Action::Add => "Adding record (Press \"Q\" + Enter in any field to cancel)",
        Action::Edit => "Editing record (Press \"Q\" + Enter in any field to cancel)",
        Action::Delete => "Deleting record (Press \"Q\" + Enter to cancel)",
        Action::ToggleStatus => "Disable/enable record (Press \"Q\" + Enter to cancel)",
        Action::Save => "Saving changes",
        Action::View => "",
    }
}

/// Run one step of a record screen and return where to go next.
pub fn handle<M: Manager + ?Sized>(
    manager: &mut M,
    step: Transition,
    actor: &Actor,
    console: &mut dyn Console,
) -> Result<Transition, StoreError> {
    let location = step.location;
    let width = manager.width();

    console.clear();
    manager
        .page(location)
        .render(console, width, manager.store().rows_per_page());

    if step.action == Action::View {
        table::footer(console, width, view_footer(location), true);
        return ask_action(manager, location, console);
    }

    table::footer(console, width, action_footer(step.action), false);
    match step.action {
        Action::Add => manager.handle_add(console)?,
        Action::Edit => manager.handle_edit(console)?,
        Action::Delete => manager.handle_delete(console)?,
        Action::ToggleStatus => manager.handle_toggle(console)?,
        Action::Save => {
            let outcome = manager
                .store_mut()
                .save(&actor.name, SaveMode::Interactive(console))?;
            debug!(?location, ?outcome, "save finished");
            if outcome.is_success() {
                return Ok(Transition::MAIN_MENU);
            }
        }
        Action::View => {}
    }
    Ok(Transition::view(location))
}

/// Read keys until one on the screen's allow-list comes in.
fn ask_action<M: Manager + ?Sized>(
    manager: &mut M,
    location: Location,
    console: &mut dyn Console,
) -> Result<Transition, StoreError> {
    let allowed = allowed_keys(location);
    loop {
        let key = console.ask_upper("Input action key:")?;
        let mut chars = key.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            console.warn("Please enter a valid action key.");
            continue;
        };
        if !allowed.contains(ch) {
            console.warn("Please enter a valid action key.");
            continue;
        }

        let store = manager.store_mut();
        let next = match ch {
            'N' => {
                store.paginate(1);
                Transition::view(location)
            }
            'P' => {
                store.paginate(-1);
                Transition::view(location)
            }
            'F' => {
                store.first_page();
                Transition::view(location)
            }
            'L' => {
                store.last_page();
                Transition::view(location)
            }
            'S' => Transition::new(location, Action::Save),
            'Q' if store.is_dirty() => Transition::new(location, Action::Save),
            'Q' => {
                store.first_page();
                Transition::MAIN_MENU
            }
            'A' => Transition::new(location, Action::Add),
            'E' => Transition::new(location, Action::Edit),
            'D' => Transition::new(location, Action::Delete),
            'X' => Transition::new(location, Action::ToggleStatus),
            _ => continue,
        };
        return Ok(next);
    }
}

/// Append a record and show the page it landed on. Running out of IDs is
/// reported to the operator and leaves the store as it was.
pub fn add_reported<R: Record>(
    store: &mut RecordStore<R>,
    record: R,
    console: &mut dyn Console,
) -> Result<(), StoreError> {
    match store.add_record(record) {
        Ok(_) => {
            store.last_page();
            Ok(())
        }
        Err(err @ StoreError::IdsExhausted(_)) => {
            console.warn(&format!("ERROR: {err}."));
            console.pause("Press enter to continue.")?;
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Prompt for an existing record id. `None` when the operator types "q".
pub fn ask_id<R: Record>(
    store: &RecordStore<R>,
    console: &mut dyn Console,
) -> std::io::Result<Option<RecordId>> {
    loop {
        let answer = console.ask("Enter ID:")?;
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        let Ok(id) = answer.parse::<RecordId>() else {
            console.warn("Please enter a valid ID.");
            continue;
        };
        if store.contains(id) {
            return Ok(Some(id));
        }
        console.warn("ID does not exist.");
    }
}
