//! Navigation guard.
//!
//! Decides, before every navigation, whether to let it through, send the
//! user elsewhere, or load the menu first.

use crate::router::{LOGIN, MAIN};

/// Facts the guard decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardInput<'a> {
    /// Target route name; `None` if the target path has no route yet.
    pub target: Option<&'a str>,
    pub has_token: bool,
    pub menu_loaded: bool,
}

/// What the navigation should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Continue to the target.
    Proceed,
    /// Navigate to the named route instead.
    Redirect(&'static str),
    /// Fetch the menu, register its routes, move to the main route, then
    /// continue to the target.
    LoadMenu,
}

/// Run the guard.
///
/// | target   | token | menu   | decision          |
/// |----------|-------|--------|-------------------|
/// | login    | no    | -      | proceed           |
/// | login    | yes   | -      | redirect to main  |
/// | other    | no    | -      | redirect to login |
/// | other    | yes   | empty  | load menu         |
/// | other    | yes   | loaded | proceed           |
pub fn decide(input: GuardInput<'_>) -> GuardDecision {
    let to_login = input.target == Some(LOGIN);
    match (to_login, input.has_token, input.menu_loaded) {
        (true, false, _) => GuardDecision::Proceed,
        (true, true, _) => GuardDecision::Redirect(MAIN),
        (false, false, _) => GuardDecision::Redirect(LOGIN),
        (false, true, false) => GuardDecision::LoadMenu,
        (false, true, true) => GuardDecision::Proceed,
    }
}
