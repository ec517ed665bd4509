pub const SHOW_MASK: &str = r#"
(id, message) => {
    if (document.getElementById(id)) return { inserted: false };
    const div = document.createElement('div');
    div.id = id;
    const span = document.createElement('span');
    span.className = 'down-loading-msg';
    span.appendChild(document.createTextNode(message));
    div.appendChild(span);
    document.body.insertBefore(div, document.body.firstChild);
    return { inserted: true };
}
"#;

pub const HIDE_MASK: &str = r#"
(id) => {
    const el = document.getElementById(id);
    if (el) el.remove();
    return el !== null;
}
"#;

pub const MASK_PRESENT: &str = r#"
(id) => document.getElementById(id) !== null
"#;
