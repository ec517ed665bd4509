// Each snippet takes (kind, query, position) where kind is "id" or "selector".

pub const COUNT_ELEMENTS: &str = r#"
(kind, query) => {
    if (kind === 'id') return document.getElementById(query) ? 1 : 0;
    return document.querySelectorAll(query).length;
}
"#;

pub const GET_HREF: &str = r#"
(kind, query, position) => {
    const el = kind === 'id'
        ? (position === 0 ? document.getElementById(query) : null)
        : document.querySelectorAll(query)[position];
    if (!el) return { found: false };
    return { found: true, href: el.href || el.getAttribute('href') || null };
}
"#;

pub const SET_HREF: &str = r#"
(kind, query, position, href) => {
    const el = kind === 'id'
        ? (position === 0 ? document.getElementById(query) : null)
        : document.querySelectorAll(query)[position];
    if (!el) return { found: false };
    el.href = href;
    return { found: true };
}
"#;

pub const NAVIGATE: &str = r#"
(url) => {
    window.location.assign(url);
    return true;
}
"#;

pub const CHECK_LOADING: &str = r#"
() => ({
    readyState: document.readyState,
    loading: document.readyState !== 'complete'
})
"#;
