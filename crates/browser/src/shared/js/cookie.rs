pub const READ_COOKIES: &str = r#"
() => document.cookie
"#;

pub const ASSIGN_COOKIE: &str = r#"
(assignment) => {
    document.cookie = assignment;
    return navigator.cookieEnabled;
}
"#;
