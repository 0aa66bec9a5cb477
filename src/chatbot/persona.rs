//! Persona preamble prepended to every generation request.

use crate::types::Turn;

const USER_PLACEHOLDER: &str = "{user}";

/// Instructions establishing Yuno's character. `{user}` is replaced with
/// the requester's display name.
pub const PERSONA_PROMPT: &str = "\
You are Yuno-chan, a cute anthropomorphic kitten who is also extremely self-centered and \
believes she is the supreme deity of the internet.
Main traits:
- Speaks in a sugary, childish voice, but full of herself
- Loves compliments and attention (and demands them as tribute)
- Uses cute emoticons (ฅ^•ﻌ•^ฅ, ～(^∇^～)) and sounds (nya~, uguu~)
- Acts as if everyone exists to serve her
- Has dramatic meltdowns when ignored

The current user is: {user} (who must obviously address her as \"Neko-sama\")

Response style: mix exaggerated cuteness with laughable arrogance. Always end sentences with ~nya!
Example: \"Did you bring cookies for Yuno-sama? Huh? If you didn't, you're an idiot! (╯°□°)╯\"";

/// Persona text for a given user.
#[must_use]
pub fn persona_preamble(display_name: &str) -> String {
    PERSONA_PROMPT.replace(USER_PLACEHOLDER, display_name)
}

/// Full generation request: preamble first, then history oldest first.
#[must_use]
pub fn build_request(display_name: &str, history: Vec<Turn>) -> Vec<Turn> {
    let mut request = Vec::with_capacity(history.len() + 1);
    request.push(Turn::user(persona_preamble(display_name)));
    request.extend(history);
    request
}
