use std::io;

use tracing::info;

use crate::app::{Context, Location, Transition};
use crate::catalog::QuestionCatalog;
use crate::ui::console::{Console, Tone};
use crate::ui::table::{boxed, rule};

const MENU_WIDTH: usize = 34;

const ENTRIES: &[(char, &str)] = &[
    ('C', "Choose a topic"),
    ('P', "Practise"),
    ('T', "Test your knowledge"),
    ('S', "Statistics"),
    ('M', "Manage questions"),
    ('U', "User profiles"),
    ('Q', "Quit program"),
];

fn destination(key: char) -> Option<Location> {
    let location = match key {
        'C' => Location::Topics,
        'P' => Location::Practice,
        'T' => Location::Test,
        'S' => Location::Statistics,
        'M' => Location::QuestionManager,
        'U' => Location::UserManager,
        'Q' => Location::Quit,
        _ => return None,
    };
    Some(location)
}

pub fn main_menu(
    context: &Context,
    catalog: &QuestionCatalog,
    console: &mut dyn Console,
) -> io::Result<Transition> {
    console.clear();
    console.say(Tone::Header, "Main menu");
    console.say(
        Tone::Normal,
        &format!("Topic: {} | User: {}", catalog.topic(), context.actor.name),
    );
    console.say(Tone::Normal, &rule(MENU_WIDTH, '┌', '┐'));
    for (key, label) in ENTRIES {
        console.say(Tone::Normal, &boxed(MENU_WIDTH, &format!("{key} - {label}")));
    }
    console.say(Tone::Normal, &rule(MENU_WIDTH, '└', '┘'));

    loop {
        let key = console.ask_upper("Input action key:")?;
        let mut chars = key.chars();
        let target = match (chars.next(), chars.next()) {
            (Some(ch), None) => destination(ch),
            _ => None,
        };
        let Some(location) = target else {
            console.warn("Please enter a valid action key.");
            continue;
        };

        let needs_questions = matches!(
            location,
            Location::Practice | Location::Test | Location::Statistics
        );
        if needs_questions && catalog.enabled_count() < context.config.min_enabled_questions {
            console.warn("You cannot use this feature as there are too few questions available.");
            console.pause("Press enter to continue.")?;
            return Ok(Transition::MAIN_MENU);
        }
        let needs_admin = matches!(location, Location::QuestionManager | Location::UserManager);
        if needs_admin && !context.actor.is_admin() {
            console.warn("You have no permission to use this feature. Press enter to continue.");
            console.pause("")?;
            return Ok(Transition::MAIN_MENU);
        }
        return Ok(Transition::view(location));
    }
}

pub fn confirm_quit(console: &mut dyn Console) -> io::Result<Transition> {
    if console.confirm("Do you really want to quit the program? y/n:")? {
        info!("quit confirmed");
        return Ok(Transition::TERMINATE);
    }
    Ok(Transition::MAIN_MENU)
}
