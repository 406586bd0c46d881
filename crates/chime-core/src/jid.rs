//! Chat identifier helpers.
//!
//! Chat identifiers have the shape `local[:device]@server`, e.g.
//! `2348012345678@s.whatsapp.net` or `2348012345678:12@s.whatsapp.net`.
//! Permission checks compare only the local part.

/// Returns the local part of a chat identifier: everything before `@`, with
/// any `:device` suffix removed.
///
/// Identifiers without `@` are returned unchanged (minus the device suffix).
pub fn local_part(id: &str) -> &str {
    let user = id.split_once('@').map_or(id, |(user, _)| user);
    user.split_once(':').map_or(user, |(user, _)| user)
}

/// Returns `true` if both identifiers share the same local part.
pub fn same_user(a: &str, b: &str) -> bool {
    local_part(a) == local_part(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_part() {
        assert_eq!(local_part("123@s.whatsapp.net"), "123");
        assert_eq!(local_part("123:7@s.whatsapp.net"), "123");
        assert_eq!(local_part("123"), "123");
        assert_eq!(local_part(""), "");
    }

    #[test]
    fn test_same_user_ignores_server_and_device() {
        assert!(same_user("123:1@s.whatsapp.net", "123@lid"));
        assert!(!same_user("123@s.whatsapp.net", "124@s.whatsapp.net"));
    }
}
