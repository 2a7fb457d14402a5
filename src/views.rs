//! Minimal server-rendered views. These are deliberately plain HTML pages;
//! presentation is not this application's concern.

/// Shown on the secret view while the user has not submitted a secret yet.
pub const DEFAULT_SECRET: &str = "Jack Bauer is my hero.";

/// Shown when a registration reuses an existing email.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already exists. Try logging in.";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n"
    )
}

/// Escape text for interpolation into HTML element content.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn home() -> String {
    page(
        "Secrets",
        "<h1>Secrets</h1>\
         <p>Don't keep your secrets, share them anonymously!</p>\
         <p><a href=\"/register\">Register</a> <a href=\"/login\">Login</a></p>",
    )
}

pub fn login() -> String {
    page(
        "Login",
        "<h1>Login</h1>\
         <form action=\"/login\" method=\"post\">\
         <label>Email <input type=\"email\" name=\"username\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Login</button>\
         </form>\
         <p><a href=\"/auth/google\">Sign in with Google</a></p>",
    )
}

pub fn register() -> String {
    page(
        "Register",
        "<h1>Register</h1>\
         <form action=\"/register\" method=\"post\">\
         <label>Email <input type=\"email\" name=\"username\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Register</button>\
         </form>\
         <p><a href=\"/auth/google\">Sign up with Google</a></p>",
    )
}

pub fn secrets(secret: &str) -> String {
    page(
        "Secrets",
        &format!(
            "<h1>You've discovered my secret!</h1>\
             <p>{}</p>\
             <p><a href=\"/submit\">Submit a secret</a> <a href=\"/logout\">Log out</a></p>",
            escape(secret)
        ),
    )
}

pub fn submit() -> String {
    page(
        "Submit",
        "<h1>Share a secret</h1>\
         <form action=\"/submit\" method=\"post\">\
         <label>Secret <input type=\"text\" name=\"secret\"></label>\
         <button type=\"submit\">Submit</button>\
         </form>",
    )
}

pub fn duplicate_email() -> String {
    page(
        "Register",
        &format!(
            "<h1>Register</h1><p>{}</p><p><a href=\"/login\">Login</a></p>",
            DUPLICATE_EMAIL_MESSAGE
        ),
    )
}

pub fn internal_error() -> String {
    page(
        "Error",
        "<h1>Something went wrong</h1><p>Please try again later.</p>",
    )
}
