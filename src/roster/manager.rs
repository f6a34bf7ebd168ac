use crate::app::Location;
use crate::roster::user::{Role, User};
use crate::roster::{PROTECTED_USER_ID, UserRoster};
use crate::screens::crud::{self, Manager};
use crate::store::{RecordId, RecordStore, StoreError};
use crate::ui::console::{Console, Tone};
use crate::ui::table::Page;

impl Manager for UserRoster {
    type Item = User;

    fn store(&self) -> &RecordStore<User> {
        UserRoster::store(self)
    }

    fn store_mut(&mut self) -> &mut RecordStore<User> {
        UserRoster::store_mut(self)
    }

    fn width(&self) -> usize {
        UserRoster::width(self)
    }

    fn page(&self, _location: Location) -> Page {
        let store = self.store();
        let provenance = store.provenance();
        Page {
            title: format!(
                "Users (last updated {} by {})",
                provenance.saved_at, provenance.saved_by
            ),
            columns: " ID  User name                    User type    Status".to_string(),
            page_label: Page::page_label(store.current_page(), store.total_pages()),
            rows: store
                .page()
                .iter()
                .map(|(id, entry)| {
                    format!(
                        "{id:3}. {:<29}{:<13}{}",
                        entry.record.name,
                        entry.record.role.code(),
                        entry.status.as_str()
                    )
                })
                .collect(),
        }
    }

    fn handle_add(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        let name = loop {
            let name = console.ask("User name:")?;
            if name.eq_ignore_ascii_case("q") {
                return Ok(());
            }
            match self.check_name(&name, None) {
                Ok(()) => break name,
                Err(err) => console.warn(&err.to_string()),
            }
        };
        let Some(role) = ask_role(console, None)? else {
            return Ok(());
        };

        if console.confirm(&format!("Do you really want to add user {name}? (y/n):"))? {
            crud::add_reported(self.store_mut(), User::new(&name, role), console)?;
        }
        Ok(())
    }

    fn handle_edit(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        let Some(id) = crud::ask_id(self.store(), console)? else {
            return Ok(());
        };
        let Some(mut user) = self.store().get(id).cloned() else {
            return Ok(());
        };
        let old_name = user.name.clone();

        loop {
            let name =
                console.ask("Enter new user name or press enter to leave it unchanged:")?;
            if name.eq_ignore_ascii_case("q") {
                return Ok(());
            }
            if name.is_empty() {
                break;
            }
            match self.check_name(&name, Some(id)) {
                Ok(()) => {
                    user.name = name;
                    break;
                }
                Err(err) => console.warn(&err.to_string()),
            }
        }
        let Some(role) = ask_role(console, Some(user.role))? else {
            return Ok(());
        };
        user.role = role;

        if console.confirm(&format!("Do you really want to update user {old_name}? (y/n):"))? {
            self.store_mut().update_record(id, user)?;
        }
        Ok(())
    }

    fn handle_delete(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        let Some(id) = crud::ask_id(self.store(), console)? else {
            return Ok(());
        };
        if id == PROTECTED_USER_ID {
            console.warn("The first administrator is stronger than you. You cannot simply delete them! :)");
            console.pause("Press enter to continue.")?;
            return Ok(());
        }
        if console.confirm(&format!("Do you really want to delete user nr. {id}? (y/n):"))? {
            delete_reported(self, id, console)?;
        }
        Ok(())
    }
}

fn delete_reported(
    roster: &mut UserRoster,
    id: RecordId,
    console: &mut dyn Console,
) -> Result<(), StoreError> {
    match roster.delete_user(id) {
        Err(err @ (StoreError::Protected(_) | StoreError::NotFound(_))) => {
            console.warn(&format!("ERROR: {err}."));
            Ok(())
        }
        other => other,
    }
}

/// `None` when the operator quits. An empty answer keeps `current` if given.
fn ask_role(console: &mut dyn Console, current: Option<Role>) -> std::io::Result<Option<Role>> {
    if let Some(role) = current {
        console.say(Tone::Header, &format!("Current user type: {}", role.code()));
    }
    loop {
        let answer = console.ask_lower("Set user type - admin or user - a/u:")?;
        if answer == "q" {
            return Ok(None);
        }
        if answer.is_empty() && current.is_some() {
            return Ok(current);
        }
        if let Some(role) = Role::from_input(&answer) {
            return Ok(Some(role));
        }
    }
}
