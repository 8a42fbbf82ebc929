//! User-facing copy for every page, looked up through a [`Translator`].

use lantern_types::{InstallMode, TemplateVariables, tokens};

/// Maps an English source string to the user's language.
pub trait Translator {
    fn tr(&self, text: &str) -> String;
}

/// Returns the source text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl Translator for English {
    fn tr(&self, text: &str) -> String {
        text.to_string()
    }
}

const LEAD: &str = "Welcome to Lantern! You're almost done.";
const TITLE: &str = "Complete Your Installation";
const INSTALLATION_TITLE: &str = "Lantern Installation";
const RUN_NOW: &str = "Run Lantern Now?";
const FINISH: &str = "Finish";
const USER_NAME_PASSWORD: &str = "<b>Please enter your user name and password from</b>";
const GMAIL_USER_NAME: &str = "Gmail E-mail Address";
const GMAIL_PASSWORD: &str = "Gmail Password";
const LOGIN_ERROR: &str = "Error logging in. E-mail or password incorrect?";

const START_BODY_CENSORED: &str = "You appear to be running Lantern to gain access to blocked \
web sites from a censored country. Is that correct?";
const START_BODY_UNCENSORED: &str = "You appear to be running Lantern from a country that does \
not employ censorship. Is that correct?";

const INSTALL1_CENSORED_BODY: &str = "Lantern uses your friends as your personal access points \
to the open internet. The more access points you have, the better your experience will be, so \
we encourage you to invite your <b>most trusted friends</b> to use Lantern. <br/><br/> Provide \
your Gmail login below to select your trusted Gmail contacts. We need this because Lantern uses \
Gmail to build its trust network. We don't store any of this information - <b>it's stored only \
on your own computer, and you log in securely over SSL</b>.";

const INSTALL1_UNCENSORED_BODY: &str = "Lantern allows Lantern users living in censored to \
access the open internet through your computer when you're not using it, creating a \
cooperative global network to combat censorship. We make these connections using your GMail \
contacts, and this is how we know it's you. We do not store your password on our servers, \
although we do store your e-mail because we need it to connect you to other users. <b>We will \
never send you e-mail or provide your e-mail to any third party, and your login happens \
securely over SSL.</b>";

const FINISHED_UNCENSORED_BODY: &str = "That's it! You're now set up to share your uncensored \
connection with those who need it. Thanks for contributing to the global fight against \
censorship!";
const FINISHED_CENSORED_BODY: &str =
    "That's it! Lantern is now configured to automatically give you access to the open internet.";
const TRUST_SELECTION_BODY: &str = "Please select your <b>trusted</b> friends below to send \
them a request to join your Lantern network. These friends will serve as especially trusted \
access points to the open internet.";

const EXIT_TITLE: &str = "Exit?";
const CANCEL_INSTALL: &str = "Are you sure you want to cancel installing Lantern?";
const CANCEL_CONFIGURE: &str = "Are you sure you want to cancel configuring Lantern?";
const IGNORE_UPDATE: &str = "Are you sure you want to ignore the update?";

/// Builds the variable sets for each page.
pub struct Catalog {
    translator: Box<dyn Translator>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Box::new(English))
    }
}

impl Catalog {
    #[must_use]
    pub fn new(translator: Box<dyn Translator>) -> Self {
        Self { translator }
    }

    fn tr(&self, text: &str) -> String {
        self.translator.tr(text)
    }

    #[must_use]
    pub fn installation_title(&self) -> String {
        self.tr(INSTALLATION_TITLE)
    }

    #[must_use]
    pub fn login_error(&self) -> String {
        self.tr(LOGIN_ERROR)
    }

    /// `lead_string` and `title_string`, shared by most pages.
    #[must_use]
    pub fn welcome(&self) -> TemplateVariables {
        TemplateVariables::new()
            .with(tokens::LEAD_STRING, self.tr(LEAD))
            .with(tokens::TITLE_STRING, self.tr(TITLE))
    }

    /// Start page: `install0Censored` or `install0Uncensored`.
    #[must_use]
    pub fn start(&self, mode: InstallMode) -> TemplateVariables {
        let vars = self.welcome();
        match mode {
            InstallMode::Censored => vars
                .with(tokens::BODY_STRING, self.tr(START_BODY_CENSORED))
                .with(
                    tokens::YES_NEED_ACCESS,
                    self.tr("Yes - I need access to the blocked internet."),
                )
                .with(
                    tokens::NO_PROVIDE_ACCESS,
                    self.tr("No - I want to provide access instead."),
                ),
            InstallMode::Uncensored => vars
                .with(tokens::BODY_STRING, self.tr(START_BODY_UNCENSORED))
                .with(
                    tokens::YES_PROVIDE_ACCESS,
                    self.tr("Yes - I want to provide access to the open internet."),
                )
                .with(
                    tokens::NO_NEED_ACCESS,
                    self.tr("No - I need to access the open internet myself."),
                ),
        }
    }

    /// Login page for `mode`.
    #[must_use]
    pub fn login_page(&self, mode: InstallMode) -> TemplateVariables {
        let vars = self.welcome();
        match mode {
            InstallMode::Censored => vars
                .with(tokens::BODY_STRING, self.tr(INSTALL1_CENSORED_BODY))
                // Not routed through the translator in the shipped copy.
                .with(tokens::USER_NAME_PASSWORD, USER_NAME_PASSWORD)
                .with(tokens::GMAIL_USER_NAME, self.tr(GMAIL_USER_NAME))
                .with(tokens::GMAIL_PASSWORD, self.tr(GMAIL_PASSWORD))
                .with(tokens::SHOW_CONTACTS, self.tr("Show My Contacts")),
            InstallMode::Uncensored => vars
                .with(tokens::BODY_STRING, self.tr(INSTALL1_UNCENSORED_BODY))
                .with(tokens::USER_NAME_PASSWORD, self.tr(USER_NAME_PASSWORD))
                .with(tokens::GMAIL_USER_NAME, self.tr(GMAIL_USER_NAME))
                .with(tokens::GMAIL_PASSWORD, self.tr(GMAIL_PASSWORD)),
        }
    }

    /// Login page for `mode` with the sign-in failure shown.
    #[must_use]
    pub fn login_failed(&self, mode: InstallMode) -> TemplateVariables {
        self.login_page(mode)
            .with(tokens::ERROR_MESSAGE, self.login_error())
    }

    #[must_use]
    pub fn finished_uncensored(&self) -> TemplateVariables {
        self.welcome()
            .with(tokens::BODY_STRING, self.tr(FINISHED_UNCENSORED_BODY))
            .with(tokens::RUN_NOW, self.tr(RUN_NOW))
            .with(tokens::FINISH_STRING, self.tr(FINISH))
    }

    #[must_use]
    pub fn finished_censored(&self) -> TemplateVariables {
        self.welcome()
            .with(tokens::TEXT_BODY, self.tr(FINISHED_CENSORED_BODY))
            .with(tokens::RUN_NOW, self.tr(RUN_NOW))
            .with(tokens::FINISH_STRING, self.tr(FINISH))
    }

    /// `install2Censored` with the rendered contact rows.
    ///
    /// The rows go last so contact names are not rewritten by page tokens.
    #[must_use]
    pub fn trust_selection(&self, contacts_div: String) -> TemplateVariables {
        self.welcome()
            .with(tokens::TEXT_BODY, self.tr(TRUST_SELECTION_BODY))
            .with(tokens::SELECT_ALL, self.tr("Select All"))
            .with(tokens::CLEAR_ALL, self.tr("Clear"))
            .with(tokens::APPROVE, self.tr("Approve these Contacts"))
            .with(tokens::CONTACTS_DIV, contacts_div)
    }

    #[must_use]
    pub fn exit_title(&self) -> String {
        self.tr(EXIT_TITLE)
    }

    #[must_use]
    pub fn cancel_prompt(&self, reconfiguration: bool) -> String {
        if reconfiguration {
            self.tr(CANCEL_CONFIGURE)
        } else {
            self.tr(CANCEL_INSTALL)
        }
    }

    #[must_use]
    pub fn ignore_update_prompt(&self) -> String {
        self.tr(IGNORE_UPDATE)
    }
}
