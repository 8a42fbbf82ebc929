//! Turns a navigation location into a [`FlowEvent`].
//!
//! Checks run in a fixed order and the first match wins:
//!
//! | location                          | event                    |
//! |-----------------------------------|--------------------------|
//! | ends with `-copy.html`            | [`FlowEvent::ServedCopy`] |
//! | contains `install1Uncensored.html` | [`FlowEvent::ChooseMode`] |
//! | contains `install1Censored.html`  | [`FlowEvent::ChooseMode`] |
//! | contains `trustedContacts`        | [`FlowEvent::TrustedContacts`] |
//! | contains `loginUncensored`        | [`FlowEvent::Login`]     |
//! | contains `loginCensored`          | [`FlowEvent::Login`]     |
//! | contains `finished`               | [`FlowEvent::Finished`]  |
//! | anything else                     | [`FlowEvent::Page`]      |

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use lantern_types::InstallMode;

use crate::errors::ParseError;
use crate::template::is_rendered_copy;

const RUN_NOW_KEY: &str = "runNow";

/// Raw login form fields. Values are taken verbatim from the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Text between `&email=` and the next `&`; `None` when either is missing.
    pub email: Option<String>,
    /// Everything after `&pwd=`; empty when absent.
    pub password: String,
}

/// What the user asked for on the final page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishChoice {
    /// Close the wizard and keep the application running.
    KeepRunning,
    /// Close the wizard and stop the application.
    Terminate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// A page this process rendered is being loaded.
    ServedCopy,
    /// The user picked a branch on the start page.
    ChooseMode(InstallMode),
    /// Contacts whose checkbox was on.
    TrustedContacts { selected: Vec<String> },
    Login { mode: InstallMode, form: LoginForm },
    Finished(FinishChoice),
    /// Any other page, named by the last path segment.
    Page { name: String },
}

pub fn classify(location: &str) -> Result<FlowEvent, ParseError> {
    if is_rendered_copy(location) {
        return Ok(FlowEvent::ServedCopy);
    }
    if location.contains("install1Uncensored.html") {
        return Ok(FlowEvent::ChooseMode(InstallMode::Uncensored));
    }
    if location.contains("install1Censored.html") {
        return Ok(FlowEvent::ChooseMode(InstallMode::Censored));
    }
    if location.contains("trustedContacts") {
        let selected = parse_trusted(substring_after(location, "trustedContacts"))?;
        return Ok(FlowEvent::TrustedContacts { selected });
    }
    if location.contains("loginUncensored") {
        return parse_login(location, InstallMode::Uncensored);
    }
    if location.contains("loginCensored") {
        return parse_login(location, InstallMode::Censored);
    }
    if location.contains("finished") {
        let choice = parse_finish(substring_after(location, "finished"))?;
        return Ok(FlowEvent::Finished(choice));
    }
    let name = location
        .rfind('/')
        .map_or("", |idx| &location[idx + 1..])
        .to_string();
    Ok(FlowEvent::Page { name })
}

/// `on` and `true` in any case.
#[must_use]
pub fn is_checked(value: &str) -> bool {
    value.eq_ignore_ascii_case("on") || value.eq_ignore_ascii_case("true")
}

/// Text after the first `separator`, or empty when it does not occur.
fn substring_after<'a>(text: &'a str, separator: &str) -> &'a str {
    text.find(separator)
        .map_or("", |idx| &text[idx + separator.len()..])
}

fn parse_login(location: &str, mode: InstallMode) -> Result<FlowEvent, ParseError> {
    if substring_after(location, "&").trim().is_empty() {
        return Err(ParseError::MissingLoginArguments {
            location: location.to_string(),
        });
    }
    let email = location.find("&email=").and_then(|start| {
        let rest = &location[start + "&email=".len()..];
        rest.find('&').map(|end| rest[..end].to_string())
    });
    let password = substring_after(location, "&pwd=").to_string();
    Ok(FlowEvent::Login {
        mode,
        form: LoginForm { email, password },
    })
}

fn parse_trusted(suffix: &str) -> Result<Vec<String>, ParseError> {
    if suffix.trim().is_empty() {
        return Ok(Vec::new());
    }
    let decoded = decode_suffix(suffix)?;
    Ok(pairs(&decoded)
        .filter(|(_, value)| is_checked(value))
        .map(|(key, _)| key.to_string())
        .collect())
}

/// No suffix at all keeps running; a suffix that decodes to nothing stops.
fn parse_finish(suffix: &str) -> Result<FinishChoice, ParseError> {
    if suffix.trim().is_empty() {
        return Ok(FinishChoice::KeepRunning);
    }
    let decoded = decode_suffix(suffix)?;
    if decoded.trim().is_empty() {
        return Ok(FinishChoice::Terminate);
    }
    let declined = pairs(&decoded).any(|(key, value)| key == RUN_NOW_KEY && !is_checked(value));
    Ok(if declined {
        FinishChoice::Terminate
    } else {
        FinishChoice::KeepRunning
    })
}

/// `key=value` pairs split on `&`. A pair without `=` has an empty value.
fn pairs(decoded: &str) -> impl Iterator<Item = (&str, &str)> {
    decoded
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

/// Form-decode `suffix` (`+` is a space) and drop one leading `?`.
fn decode_suffix(suffix: &str) -> Result<String, ParseError> {
    let decoded = form_decode(suffix)?;
    Ok(match decoded.strip_prefix('?') {
        Some(rest) => rest.to_string(),
        None => decoded,
    })
}

fn form_decode(input: &str) -> Result<String, ParseError> {
    let bytes = input.as_bytes();
    for (offset, _) in input.match_indices('%') {
        let escape = bytes.get(offset + 1..offset + 3);
        if !matches!(escape, Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()) {
            return Err(ParseError::MalformedEscape {
                input: input.to_string(),
                offset,
            });
        }
    }
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| ParseError::InvalidUtf8 {
            input: input.to_string(),
        })
}
