pub mod manager;
pub mod user;

use tracing::{info, warn};

use crate::roster::user::{Role, User, UserNameError, validate_user_name};
use crate::store::{RecordId, RecordStatus, RecordStore, SaveMode, StoreError, StoreOptions};
use crate::ui::console::{Console, Tone};

/// The first administrator. It can never be deleted.
pub const PROTECTED_USER_ID: RecordId = 1;
pub const LOGIN_ATTEMPTS: usize = 3;
const BOOTSTRAP_ADMIN: &str = "admin";

/// Who is operating the program. Stamped on every save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: RecordId,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub struct UserRoster {
    store: RecordStore<User>,
    width: usize,
}

impl UserRoster {
    pub fn open(
        options: StoreOptions,
        user_file: &str,
        width: usize,
        console: &mut dyn Console,
    ) -> Result<Self, StoreError> {
        let store = RecordStore::open(options, user_file, console)?;
        Ok(Self::from_store(store, width))
    }

    pub fn from_store(store: RecordStore<User>, width: usize) -> Self {
        Self { store, width }
    }

    /// Create the roster with a single administrator if the file is missing.
    pub fn bootstrap(options: &StoreOptions, user_file: &str) -> Result<bool, StoreError> {
        if options.file_path(user_file).exists() {
            return Ok(false);
        }
        std::fs::create_dir_all(&options.data_dir)?;
        let mut store = RecordStore::new(options.clone(), user_file);
        store.add_record(User::new(BOOTSTRAP_ADMIN, Role::Admin))?;
        store.save("setup", SaveMode::Silent)?;
        info!(user_file, "created user roster with default administrator");
        Ok(true)
    }

    pub fn store(&self) -> &RecordStore<User> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<User> {
        &mut self.store
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn find_by_name(&self, name: &str) -> Option<(RecordId, &User)> {
        self.store.find_by_field("Name", name)
    }

    pub fn actor_for(&self, name: &str) -> Option<Actor> {
        self.find_by_name(name).map(|(id, user)| Actor {
            id,
            name: user.name.clone(),
            role: user.role,
        })
    }

    /// The current name and role of user `id`, unless it is tagged for deletion.
    pub fn actor_by_id(&self, id: RecordId) -> Option<Actor> {
        let entry = self.store.entry(id)?;
        if entry.status == RecordStatus::Deleted {
            return None;
        }
        Some(Actor {
            id,
            name: entry.record.name.clone(),
            role: entry.record.role,
        })
    }

    /// Valid and not used by any user other than `except`.
    pub fn check_name(&self, name: &str, except: Option<RecordId>) -> Result<(), UserNameError> {
        validate_user_name(name)?;
        match self.find_by_name(name) {
            Some((id, _)) if Some(id) != except => Err(UserNameError::Taken(name.to_string())),
            _ => Ok(()),
        }
    }

    pub fn delete_user(&mut self, id: RecordId) -> Result<(), StoreError> {
        if id == PROTECTED_USER_ID {
            warn!(id, "refused to delete protected user");
            return Err(StoreError::Protected(id));
        }
        self.store.mark_deleted(id)
    }

    /// Ask for a user name until it matches, the operator quits, or the
    /// attempts run out.
    pub fn login(&self, console: &mut dyn Console) -> std::io::Result<Option<Actor>> {
        console.clear();
        console.say(Tone::Header, "Welcome to our Quizz Machine!");
        console.say(Tone::Normal, "\nPlease log in and train your brain.\n");

        for _ in 0..LOGIN_ATTEMPTS {
            let name = console.ask("Enter your user name (or q + enter to cancel):")?;
            if name.eq_ignore_ascii_case("q") {
                break;
            }
            if let Some(actor) = self.actor_for(&name) {
                info!(user = %actor.name, role = actor.role.code(), "logged in");
                return Ok(Some(actor));
            }
            warn!(attempted = %name, "login failed");
            console.warn("Login failed.");
        }
        Ok(None)
    }
}
