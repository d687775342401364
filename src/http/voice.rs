//! Call-center voice menu.
//!
//! `POST /incoming-call` answers with the main menu; the caller's keypresses
//! come back to `POST /catfacts-call-menu`.

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, info};

use super::AppState;
use super::twiml::Twiml;
use crate::notifier;

const GREETING: &str = "Thank you for calling Cat Facts!";
const HOLD: &str = "Cat Facts is the number one provider of fun facts about cats! All of our representatives are currently assisting other cat lovers. Please remain on the feline! In the meantime, please listen carefully as our menu options have recently changed.";
const MENU_OPTIONS: &str = "If you would like to receive a fun cat fact right now, press 1. If you would like to learn about how you were subscribed to CAT FACTS, please press 2";
const MENU_UNSUBSCRIBE: &str = "If for some fur-brained reason you would like to unsubscribe from fantastic hourly cat facts, please press 3 3 3 3 4 6 7 8 9 3 1 2 6 in order right now";

const FACT_COMING: &str = "One brand spanking new Cat Fact coming right up. We're working hard to deliver your fact. Thanks for using CatFacts and please call again!";
const ACCOUNT_LOOKUP: &str = "Please wait one moment while I pull up your account";
const ACCOUNT_REASON: &str = "Thanks for your patience. You were subscribed to CatFacts because you love fun facts about cats. As a thank you for calling in today, we will increase the frequency of your catfacts account at no extra charge";
const FAREWELL: &str = "Have a furry and fantastic day";
const UNSUBSCRIBE_REFUSAL: &str = "We understand you would like to cancel your CatFacts account. Unfortunately, we are currently experiencing technical difficulties and cannot process your request at this time. To apologize for the inconvenience, we have upgraded you to a Super CatFacts Account for no extra charge";
const APOLOGY: &str = "Sorry, we were unable to process your request at this time. Don't worry, we will send you complimentary CatFacts as an apology for the inconvenience.";

/// Form fields posted by the gateway after a `Gather`.
#[derive(Debug, Deserialize)]
pub struct MenuSelection {
    /// Keys the caller pressed.
    #[serde(rename = "Digits", default)]
    pub digits: String,
    /// Caller's number.
    #[serde(rename = "From", default)]
    pub from: String,
}

/// Caller's choice from the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Text me a fact.
    SendFact,
    /// Why am I subscribed?
    AccountInfo,
    /// Unsubscribe.
    Unsubscribe,
    /// Anything else.
    Unknown,
}

impl MenuChoice {
    /// Maps the pressed digits to a choice.
    #[must_use]
    pub fn from_digits(digits: &str) -> Self {
        match digits.trim() {
            "1" => Self::SendFact,
            "2" => Self::AccountInfo,
            "3" => Self::Unsubscribe,
            _ => Self::Unknown,
        }
    }
}

/// Builds the main menu document.
#[must_use]
pub fn main_menu(server_root: &str) -> Twiml {
    Twiml::new()
        .say(GREETING)
        .play(sound(server_root, "shortMeow.wav"))
        .say(HOLD)
        .gather(
            format!("{server_root}/catfacts-call-menu"),
            "*",
            |prompt| prompt.say(MENU_OPTIONS).say(MENU_UNSUBSCRIBE),
        )
}

/// Builds the reply for a menu choice.
#[must_use]
pub fn menu_reply(choice: MenuChoice, server_root: &str) -> Twiml {
    let angry_meow = sound(server_root, "angryMeow.wav");
    match choice {
        MenuChoice::SendFact => Twiml::new().say(FACT_COMING).play(angry_meow),
        MenuChoice::AccountInfo => Twiml::new()
            .say(ACCOUNT_LOOKUP)
            .play(sound(server_root, "longMeow.wav"))
            .say(ACCOUNT_REASON)
            .play(angry_meow)
            .say(FAREWELL),
        MenuChoice::Unsubscribe => Twiml::new().say(UNSUBSCRIBE_REFUSAL).play(angry_meow),
        MenuChoice::Unknown => Twiml::new().say(APOLOGY).play(angry_meow),
    }
}

fn sound(server_root: &str, file: &str) -> String {
    format!("{server_root}/sounds/{file}")
}

fn xml(doc: &Twiml) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], doc.render()).into_response()
}

/// `POST /incoming-call`
pub async fn handle_incoming_call(State(state): State<Arc<AppState>>) -> Response {
    debug!("incoming call");
    xml(&main_menu(&state.server_root))
}

/// `POST /catfacts-call-menu`
pub async fn handle_menu_selection(
    State(state): State<Arc<AppState>>,
    Form(selection): Form<MenuSelection>,
) -> Response {
    let choice = MenuChoice::from_digits(&selection.digits);
    info!(from = %selection.from, ?choice, "menu selection");

    if choice == MenuChoice::SendFact && !selection.from.is_empty() {
        if let Some(fact) = state.content.random() {
            notifier::deliver_detached(
                Arc::clone(&state.notifier),
                selection.from.clone(),
                state.sender.clone(),
                fact.to_string(),
            );
        }
    }

    xml(&menu_reply(choice, &state.server_root))
}
