/// Replace `${ENV_VAR}` placeholders in raw config text.
///
/// Variables that are unset, and placeholders that never close, are left
/// exactly as written.
pub fn substitute_env(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        match tail.find('}') {
            Some(end) if end > 0 => {
                let var_name = &tail[..end];
                match std::env::var(var_name) {
                    Ok(value) => result.push_str(&value),
                    Err(_) => {
                        result.push_str("${");
                        result.push_str(var_name);
                        result.push('}');
                    },
                }
                rest = &tail[end + 1..];
            },
            _ => {
                // Empty or unterminated placeholder — emit literally.
                result.push_str("${");
                rest = tail;
            },
        }
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
#[allow(unsafe_code)] // set_var/remove_var are unsafe in edition 2024
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_var() {
        unsafe { std::env::set_var("HUDDLE_TEST_VAR", "lobby") };
        assert_eq!(substitute_env("room=${HUDDLE_TEST_VAR}"), "room=lobby");
        unsafe { std::env::remove_var("HUDDLE_TEST_VAR") };
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env("${HUDDLE_NONEXISTENT_XYZ}"),
            "${HUDDLE_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_env("port = ${PO"), "port = ${PO");
        assert_eq!(substitute_env("${}after"), "${}after");
    }
}
