//! End-to-end walks through the wizard over recording fakes.
//!
//! Locations are written the way a browser-backed host would report them.

use lantern_core::{CloseIntent, DocumentHandle, FlowState, HostAction, LookupSettings};
use lantern_types::InstallMode;

use crate::common::{Scenario, fake_wizard, page};

fn display(name: &str) -> HostAction {
    HostAction::Display(DocumentHandle::new(format!("memory:{name}")))
}

#[test]
fn censored_install_selects_trusted_contacts() {
    let scenario = Scenario {
        trusted: vec!["bob@gmail.com".to_string()],
        ..Scenario::new("x")
            .contact("bob@gmail.com", "Bob")
            .contact("carol@gmail.com", "")
    };
    let (mut wizard, record) = fake_wizard(scenario);

    assert_eq!(wizard.start(), display("install0Uncensored-copy.html"));
    assert_eq!(wizard.navigate("memory:install0Uncensored-copy.html"), HostAction::Nothing);

    assert_eq!(
        wizard.navigate("file:///srv/install1Censored.html"),
        display("install1Censored-copy.html")
    );
    assert_eq!(record.borrow().forced, 1);

    assert_eq!(
        wizard.navigate("file:///srv/loginCensored?&email=alice&pwd=x"),
        display("install2Censored-copy.html")
    );
    assert_eq!(
        record.borrow().lookups,
        vec![("alice@gmail.com".to_string(), "x".to_string(), 5)]
    );
    assert_eq!(
        record.borrow().saved_credentials,
        vec![("alice@gmail.com".to_string(), "x".to_string())]
    );

    let rows = page(&record, "install2Censored.html");
    assert!(rows.contains("<span class='contactName'>Bob</span>"));
    assert!(rows.contains("name='bob@gmail.com' class='contactCheck'  checked='true'/>"));
    // A blank name shows the identifier.
    assert!(rows.contains("<span class='contactName'>carol@gmail.com</span>"));
    assert!(rows.contains("name='carol@gmail.com' class='contactCheck' />"));
    assert_eq!(wizard.session().context().state, FlowState::TrustSelection);

    assert_eq!(
        wizard.navigate(
            "file:///srv/trustedContacts?bob%40gmail.com=on&carol%40gmail.com=on&dave%40gmail.com=off"
        ),
        display("installFinishedCensored-copy.html")
    );
    assert!(wizard.flow().trust().is_trusted("carol@gmail.com"));
    assert!(!wizard.flow().trust().is_trusted("dave@gmail.com"));
    assert_eq!(
        record.borrow().trust_saves,
        vec![vec!["bob@gmail.com".to_string(), "carol@gmail.com".to_string()]]
    );

    assert_eq!(
        wizard.navigate("file:///srv/finished?runNow=on"),
        HostAction::ClosePresentation
    );
    assert_eq!(record.borrow().installed, 1);
    assert!(wizard.is_closed());
    assert!(wizard.teardown().has_run());
}

#[test]
fn uncensored_install_signs_in_once() {
    let (mut wizard, record) = fake_wizard(Scenario::new("secret"));
    wizard.start();

    wizard.navigate("file:///srv/install1Uncensored.html");
    assert_eq!(record.borrow().unforced, 1);

    assert_eq!(
        wizard.navigate("file:///srv/loginUncensored?&email=alice@example.org&pwd=secret"),
        display("installFinishedUncensored-copy.html")
    );
    assert_eq!(
        record.borrow().lookups,
        vec![("alice@example.org".to_string(), "secret".to_string(), 1)]
    );
    assert!(page(&record, "installFinishedUncensored.html").contains("Run Lantern Now?"));
}

#[test]
fn bare_identifier_takes_the_configured_domain() {
    let scenario = Scenario {
        lookup: Some(LookupSettings {
            default_domain: "default".to_string(),
            ..LookupSettings::default()
        }),
        ..Scenario::new("x").contact("alice@default", "")
    };
    let (mut wizard, record) = fake_wizard(scenario);
    wizard.start();

    wizard.navigate("file:///srv/install1Uncensored.html");
    assert_eq!(
        wizard.navigate("file:///srv/loginUncensored?&email=alice&pwd=x"),
        display("installFinishedUncensored-copy.html")
    );
    assert_eq!(
        record.borrow().lookups,
        vec![("alice@default".to_string(), "x".to_string(), 1)]
    );

    wizard.navigate("file:///srv/install1Censored.html");
    wizard.navigate("file:///srv/loginCensored?&email=alice&pwd=x");
    let rows = page(&record, "install2Censored.html");
    assert!(rows.contains("<span class='contactName'>alice@default</span>"));
    assert!(rows.contains("name='alice@default' class='contactCheck' />"));
}

#[test]
fn larger_lookup_budget_is_held_to_five() {
    let scenario = Scenario {
        lookup: Some(LookupSettings {
            censored_attempts: 7,
            ..LookupSettings::default()
        }),
        ..Scenario::new("x")
    };
    let (mut wizard, record) = fake_wizard(scenario);
    wizard.start();
    wizard.navigate("file:///srv/install1Censored.html");
    wizard.navigate("file:///srv/loginCensored?&email=alice&pwd=x");
    assert_eq!(
        record.borrow().lookups,
        vec![("alice@gmail.com".to_string(), "x".to_string(), 5)]
    );
}

#[test]
fn contact_named_like_a_token_renders_verbatim() {
    let scenario = Scenario::new("x").contact("installation_title@x", "");
    let (mut wizard, record) = fake_wizard(scenario);
    wizard.start();
    wizard.navigate("file:///srv/install1Censored.html");
    wizard.navigate("file:///srv/loginCensored?&email=alice&pwd=x");
    let rows = page(&record, "install2Censored.html");
    assert!(rows.contains("name='installation_title@x'"));
    assert!(!rows.contains("Lantern Installation@x"));
}

#[test]
fn finish_without_suffix_keeps_running() {
    let (mut wizard, record) = fake_wizard(Scenario::new("x"));
    wizard.start();
    assert_eq!(
        wizard.navigate("file:///srv/finished"),
        HostAction::ClosePresentation
    );
    assert_eq!(record.borrow().installed, 1);
    assert!(wizard.is_closed());
}

#[test]
fn empty_finish_suffix_terminates() {
    let (mut wizard, record) = fake_wizard(Scenario::new("x"));
    wizard.start();
    assert_eq!(
        wizard.navigate("file:///srv/finished?"),
        HostAction::Exit { code: 1 }
    );
    assert_eq!(record.borrow().installed, 1);
    assert!(wizard.teardown().has_run());
}

#[test]
fn declining_run_now_terminates() {
    let (mut wizard, _) = fake_wizard(Scenario::new("x"));
    wizard.start();
    assert_eq!(
        wizard.navigate("file:///srv/finished?runNow=off"),
        HostAction::Exit { code: 1 }
    );
}

#[test]
fn reconfiguration_keeps_the_host_running() {
    let scenario = Scenario {
        reconfigure: true,
        ..Scenario::new("x")
    };
    let (mut wizard, record) = fake_wizard(scenario);
    wizard.start();
    assert_eq!(
        wizard.navigate("file:///srv/finished?runNow=off"),
        HostAction::ClosePresentation
    );
    assert_eq!(record.borrow().reconfigured, 1);
    assert_eq!(record.borrow().installed, 1);
    assert!(wizard.is_closed());
}

#[test]
fn repeated_location_is_handled_once() {
    let (mut wizard, record) = fake_wizard(Scenario::new("x"));
    wizard.start();
    assert_eq!(
        wizard.navigate("file:///srv/install1Censored.html"),
        display("install1Censored-copy.html")
    );
    assert_eq!(wizard.navigate("file:///srv/install1Censored.html"), HostAction::Nothing);
    assert_eq!(record.borrow().forced, 1);
}

#[test]
fn detected_censorship_is_never_overridden() {
    let scenario = Scenario {
        detected: true,
        ..Scenario::new("x")
    };
    let (mut wizard, record) = fake_wizard(scenario);
    assert_eq!(wizard.start(), display("install0Censored-copy.html"));
    assert!(page(&record, "install0Censored.html").contains("Yes - I need access to the blocked internet."));

    wizard.navigate("file:///srv/install1Uncensored.html");
    wizard.navigate("file:///srv/install1Censored.html");
    assert_eq!(record.borrow().forced, 0);
    assert_eq!(record.borrow().unforced, 0);
}

#[test]
fn failed_sign_in_shows_the_error_on_the_login_page() {
    let (mut wizard, record) = fake_wizard(Scenario::new("right"));
    wizard.start();
    wizard.navigate("file:///srv/install1Censored.html");
    assert!(page(&record, "install1Censored.html").contains("<p class='error'></p>"));

    assert_eq!(
        wizard.navigate("file:///srv/loginCensored?&email=alice&pwd=wrong"),
        display("install1Censored-copy.html")
    );
    assert!(
        page(&record, "install1Censored.html")
            .contains("Error logging in. E-mail or password incorrect?")
    );
    assert!(record.borrow().saved_credentials.is_empty());
    assert_eq!(
        wizard.session().context().state,
        FlowState::LoginForm(InstallMode::Censored)
    );
}

#[test]
fn blank_fields_never_reach_the_directory() {
    let (mut wizard, record) = fake_wizard(Scenario::new("x"));
    wizard.start();
    wizard.navigate("file:///srv/install1Censored.html");

    wizard.navigate("file:///srv/loginCensored?&email=&pwd=x");
    wizard.navigate("file:///srv/loginCensored?&email=alice&pwd=");
    // No `&email=...&` segment at all.
    wizard.navigate("file:///srv/loginCensored?&pwd=x");
    assert!(record.borrow().lookups.is_empty());
    assert!(
        page(&record, "install1Censored.html")
            .contains("Error logging in. E-mail or password incorrect?")
    );
}

#[test]
fn unparseable_locations_are_ignored() {
    let (mut wizard, record) = fake_wizard(Scenario::new("x"));
    wizard.start();
    assert_eq!(wizard.navigate("file:///srv/loginCensored"), HostAction::Nothing);
    assert_eq!(
        wizard.navigate("file:///srv/trustedContacts?bob%4=on"),
        HostAction::Nothing
    );
    assert!(record.borrow().trust_saves.is_empty());
    assert_eq!(wizard.session().context().state, FlowState::ModeChoice);
}

#[test]
fn unknown_page_without_template_stays_put() {
    let (mut wizard, _) = fake_wizard(Scenario::new("x"));
    wizard.start();
    assert_eq!(wizard.navigate("file:///srv/help.html"), HostAction::Nothing);
    assert_eq!(wizard.session().context().state, FlowState::ModeChoice);
}

#[test]
fn events_after_close_are_ignored() {
    let (mut wizard, record) = fake_wizard(Scenario::new("x"));
    wizard.start();
    wizard.navigate("file:///srv/finished?runNow=on");
    assert_eq!(wizard.navigate("file:///srv/install1Censored.html"), HostAction::Nothing);
    assert_eq!(record.borrow().forced, 0);
}

#[test]
fn confirmed_close_forgets_credentials() {
    let (mut wizard, record) = fake_wizard(Scenario::new("x"));
    wizard.start();
    wizard.navigate("file:///srv/install1Uncensored.html");
    wizard.navigate("file:///srv/loginUncensored?&email=alice&pwd=x");
    assert_eq!(record.borrow().saved_credentials.len(), 1);

    let mut asked = Vec::new();
    let declined = wizard.close_requested(|title, question| {
        asked.push(format!("{title} {question}"));
        false
    });
    assert_eq!(declined, CloseIntent::Cancelled);
    assert_eq!(record.borrow().cleared_credentials, 0);

    let confirmed = wizard.close_requested(|_, _| true);
    assert_eq!(confirmed, CloseIntent::Confirmed(HostAction::Exit { code: 1 }));
    assert_eq!(record.borrow().cleared_credentials, 1);
    assert!(record.borrow().saved_credentials.is_empty());
    assert_eq!(
        asked,
        vec!["Exit? Are you sure you want to cancel installing Lantern?".to_string()]
    );
}

#[test]
fn reconfiguration_close_keeps_the_host() {
    let scenario = Scenario {
        reconfigure: true,
        ..Scenario::new("x")
    };
    let (mut wizard, _) = fake_wizard(scenario);
    wizard.start();
    let mut question = String::new();
    let outcome = wizard.close_requested(|_, q| {
        question = q.to_string();
        true
    });
    assert_eq!(question, "Are you sure you want to cancel configuring Lantern?");
    assert_eq!(outcome, CloseIntent::Confirmed(HostAction::ClosePresentation));
    assert!(wizard.is_closed());
}

#[test]
fn closing_after_finish_needs_no_confirmation() {
    let (mut wizard, _) = fake_wizard(Scenario::new("x"));
    wizard.start();
    wizard.navigate("file:///srv/finished?runNow=on");
    let outcome = wizard.close_requested(|_, _| panic!("should not ask"));
    assert_eq!(outcome, CloseIntent::Allow);
}

#[test]
fn rendering_is_deterministic() {
    let (mut first, first_record) = fake_wizard(Scenario::new("x"));
    let (mut second, second_record) = fake_wizard(Scenario::new("x"));
    first.start();
    second.start();
    assert_eq!(
        page(&first_record, "install0Uncensored.html"),
        page(&second_record, "install0Uncensored.html")
    );
    let start = page(&first_record, "install0Uncensored.html");
    assert!(start.starts_with("<title>Lantern Installation</title><h1>Complete Your Installation</h1>"));
    assert!(!start.contains("installation_title"));
}
