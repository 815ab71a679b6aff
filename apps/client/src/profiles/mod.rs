// Coding-profile linking: normalizes whatever the student pastes into the
// profile form (bare username, path fragment, or full URL) into the bare
// platform username the backend stores.

pub mod usernames;
