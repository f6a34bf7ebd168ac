use tracing::debug;

use crate::catalog::QuestionCatalog;
use crate::config::Config;
use crate::roster::{Actor, UserRoster};
use crate::screens::{crud, menu, topics};
use crate::session::result::ResultsLog;
use crate::session::{exam, practice};
use crate::store::StoreError;
use crate::ui::console::Console;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    MainMenu,
    Topics,
    UserManager,
    QuestionManager,
    Statistics,
    Practice,
    Test,
    Quit,
    Terminate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    View,
    Add,
    Edit,
    Delete,
    ToggleStatus,
    Save,
}

/// The next step of the navigation loop: where to go and what to do there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub location: Location,
    pub action: Action,
}

impl Transition {
    pub const MAIN_MENU: Transition = Transition::view(Location::MainMenu);
    pub const TERMINATE: Transition = Transition::view(Location::Terminate);

    pub const fn new(location: Location, action: Action) -> Self {
        Self { location, action }
    }

    pub const fn view(location: Location) -> Self {
        Self::new(location, Action::View)
    }

    pub fn is_terminal(self) -> bool {
        self.location == Location::Terminate
    }
}

/// State shared by every screen for the whole run.
pub struct Context {
    pub actor: Actor,
    pub config: Config,
}

pub struct App {
    users: UserRoster,
    questions: QuestionCatalog,
    results: ResultsLog,
    context: Context,
    current: Transition,
}

impl App {
    pub fn new(users: UserRoster, questions: QuestionCatalog, context: Context) -> Self {
        let results = ResultsLog::new(context.config.results_path());
        Self {
            users,
            questions,
            results,
            context,
            current: Transition::MAIN_MENU,
        }
    }

    pub fn current(&self) -> Transition {
        self.current
    }

    pub fn users(&self) -> &UserRoster {
        &self.users
    }

    pub fn questions(&self) -> &QuestionCatalog {
        &self.questions
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Dispatch the current transition to its screen and move to the result.
    pub fn step(&mut self, console: &mut dyn Console) -> Result<Transition, StoreError> {
        let step = self.current;
        let actor = &self.context.actor;
        let next = match step.location {
            Location::MainMenu => menu::main_menu(&self.context, &self.questions, console)?,
            Location::Topics => topics::choose_topic(&mut self.questions, &self.context, console)?,
            Location::UserManager => {
                let next = crud::handle(&mut self.users, step, actor, console)?;
                self.refresh_actor();
                next
            }
            Location::QuestionManager | Location::Statistics => {
                crud::handle(&mut self.questions, step, actor, console)?
            }
            Location::Practice => practice::run(&mut self.questions, actor, console)?,
            Location::Test => exam::run(&mut self.questions, &self.results, actor, console)?,
            Location::Quit => menu::confirm_quit(console)?,
            Location::Terminate => Transition::TERMINATE,
        };
        debug!(from = ?step, to = ?next, "transition");
        self.current = next;
        Ok(next)
    }

    /// Follow edits, saves and discards of the logged-in user's own record.
    fn refresh_actor(&mut self) {
        if let Some(actor) = self.users.actor_by_id(self.context.actor.id) {
            if actor != self.context.actor {
                debug!(from = %self.context.actor.name, to = %actor.name, "actor changed");
                self.context.actor = actor;
            }
        }
    }

    /// Step until a confirmed quit reaches `Terminate`.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        while !self.current.is_terminal() {
            self.step(console)?;
        }
        Ok(())
    }
}
