use axum::{extract::Path, response::Html};

/// GET /session/:token
///
/// Static landing page for share links. Its sole purpose is to give the
/// browser extension a navigational target to intercept; the token is not
/// inspected here, only its first characters are shown as a hint.
pub async fn session_landing(Path(token): Path<String>) -> Html<String> {
    let hint: String = token.chars().take(8).collect();

    Html(format!(
        r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Session handoff</title>
  </head>
  <body>
    <h1>Session handoff</h1>
    <p>Share <code>{}&hellip;</code> is ready.</p>
    <p>Open this page in a browser with the handoff extension installed to
    receive the session.</p>
  </body>
</html>
"#,
        hint
    ))
}
