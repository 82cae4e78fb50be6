//! Login, signup and feedback forms.

use agri_logging::{agri_debug, agri_info, agri_warn};

use crate::advisory::Outcome;
use crate::{Effect, Notice, ServiceReply, SessionContext, UserSession};

const LOGIN_TITLE: &str = "Login";
const SIGNUP_TITLE: &str = "Signup";
const CONNECTION_FAILED: &str = "Connection failed. Please try again.";
const MIN_PASSWORD_CHARS: usize = 8;

/// Roles the backend accepts at login and signup.
pub const ROLES: [&str; 3] = ["farmer", "officer", "normal_user"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl LoginForm {
    fn validate(&self) -> Result<(), &'static str> {
        if self.username.is_empty() || self.password.is_empty() || self.role.is_empty() {
            return Err("Please fill in all fields.");
        }
        check_role(&self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
    pub terms_accepted: bool,
}

impl SignupForm {
    /// Trims the identity fields. Passwords are taken verbatim.
    fn normalized(mut self) -> Self {
        for field in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.email,
            &mut self.username,
        ] {
            *field = field.trim().to_string();
        }
        self
    }

    fn validate(&self) -> Result<(), &'static str> {
        let required = [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.username,
            &self.password,
            &self.confirm_password,
            &self.role,
        ];
        if required.iter().any(|value| value.is_empty()) {
            return Err("Please fill in all required fields.");
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match.");
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err("Password must be at least 8 characters long.");
        }
        if !self.terms_accepted {
            return Err("You must accept the terms and conditions.");
        }
        check_role(&self.role)
    }
}

fn check_role(role: &str) -> Result<(), &'static str> {
    if ROLES.contains(&role) {
        Ok(())
    } else {
        Err("Please choose a valid role: farmer, officer or normal_user.")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedbackForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl FeedbackForm {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountMsg {
    LoginSubmitted(LoginForm),
    LoggedIn(ServiceReply<UserSession>),
    SignupSubmitted(SignupForm),
    /// Carries the created username.
    SignedUp(ServiceReply<String>),
    FeedbackSubmitted(FeedbackForm),
    FeedbackSent(ServiceReply<()>),
}

/// In-flight flags of the account forms; each form sends one request at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountState {
    login_pending: bool,
    signup_pending: bool,
    feedback_pending: bool,
}

impl AccountState {
    pub fn login_pending(&self) -> bool {
        self.login_pending
    }

    pub fn signup_pending(&self) -> bool {
        self.signup_pending
    }

    pub fn feedback_pending(&self) -> bool {
        self.feedback_pending
    }

    pub(crate) fn apply(&mut self, event: AccountMsg, session: &mut SessionContext) -> Outcome {
        match event {
            AccountMsg::LoginSubmitted(form) => {
                if self.login_pending {
                    agri_debug!("login ignored while another is pending");
                    return Outcome::default();
                }
                if let Err(message) = form.validate() {
                    return Outcome::notice(Notice::danger(LOGIN_TITLE, message));
                }
                self.login_pending = true;
                Outcome::effect(Effect::Login(form))
            }
            AccountMsg::LoggedIn(reply) => {
                self.login_pending = false;
                match reply {
                    ServiceReply::Done(user) => {
                        agri_info!("signed in as {} ({})", user.user, user.role);
                        let welcome = format!("Welcome, {}!", user.user);
                        session.populate(Some(user));
                        Outcome::notice(Notice::success(LOGIN_TITLE, welcome))
                    }
                    ServiceReply::Rejected { error } => Outcome::notice(Notice::rejected(
                        LOGIN_TITLE,
                        error,
                        "Login failed. Please try again.",
                    )),
                    ServiceReply::Transport { reason } => {
                        agri_warn!("login failed: {}", reason);
                        Outcome::notice(Notice::danger(LOGIN_TITLE, CONNECTION_FAILED))
                    }
                }
            }
            AccountMsg::SignupSubmitted(form) => {
                if self.signup_pending {
                    agri_debug!("signup ignored while another is pending");
                    return Outcome::default();
                }
                let form = form.normalized();
                if let Err(message) = form.validate() {
                    return Outcome::notice(Notice::danger(SIGNUP_TITLE, message));
                }
                self.signup_pending = true;
                Outcome::effect(Effect::Signup(form))
            }
            AccountMsg::SignedUp(reply) => {
                self.signup_pending = false;
                match reply {
                    ServiceReply::Done(user) => Outcome::notice(Notice::success(
                        SIGNUP_TITLE,
                        format!("Account {user} created successfully! You can now log in."),
                    )),
                    ServiceReply::Rejected { error } => Outcome::notice(Notice::rejected(
                        SIGNUP_TITLE,
                        error,
                        "Signup failed. Please try again.",
                    )),
                    ServiceReply::Transport { reason } => {
                        agri_warn!("signup failed: {}", reason);
                        Outcome::notice(Notice::danger(SIGNUP_TITLE, CONNECTION_FAILED))
                    }
                }
            }
            AccountMsg::FeedbackSubmitted(form) => {
                if self.feedback_pending {
                    agri_debug!("feedback ignored while another is pending");
                    return Outcome::default();
                }
                self.feedback_pending = true;
                Outcome::effect(Effect::SubmitFeedback(form.normalized()))
            }
            AccountMsg::FeedbackSent(reply) => {
                self.feedback_pending = false;
                match reply {
                    ServiceReply::Done(()) => Outcome::notice(Notice::success(
                        "Feedback Submitted",
                        "Thank you for your feedback!",
                    )),
                    ServiceReply::Rejected { error } => {
                        Outcome::notice(Notice::rejected("Feedback Error", error, "Please try again."))
                    }
                    ServiceReply::Transport { reason } => {
                        agri_warn!("feedback failed: {}", reason);
                        Outcome::notice(Notice::danger(
                            "Connection Error",
                            "Unable to submit feedback right now.",
                        ))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            first_name: " Asha ".into(),
            last_name: "Rao".into(),
            email: "asha@example.com".into(),
            username: "asha".into(),
            password: "harvest2024".into(),
            confirm_password: "harvest2024".into(),
            role: "farmer".into(),
            terms_accepted: true,
        }
    }

    #[test]
    fn signup_checks_run_in_form_order() {
        assert_eq!(signup().normalized().validate(), Ok(()));

        let mut form = signup();
        form.last_name = "   ".into();
        assert_eq!(
            form.normalized().validate(),
            Err("Please fill in all required fields.")
        );

        let mut form = signup();
        form.confirm_password = "harvest2025".into();
        assert_eq!(form.validate(), Err("Passwords do not match."));

        let mut form = signup();
        form.password = "short".into();
        form.confirm_password = "short".into();
        assert_eq!(
            form.validate(),
            Err("Password must be at least 8 characters long.")
        );

        let mut form = signup();
        form.terms_accepted = false;
        assert_eq!(
            form.validate(),
            Err("You must accept the terms and conditions.")
        );
    }

    #[test]
    fn signup_trims_identity_but_not_password() {
        let mut form = signup();
        form.password = " spaced pass ".into();
        let form = form.normalized();
        assert_eq!(form.first_name, "Asha");
        assert_eq!(form.password, " spaced pass ");
    }

    #[test]
    fn login_requires_every_field() {
        let form = LoginForm {
            username: "farmer".into(),
            password: String::new(),
            role: "farmer".into(),
        };
        assert_eq!(form.validate(), Err("Please fill in all fields."));

        let form = LoginForm {
            username: "farmer".into(),
            password: "farmer123".into(),
            role: "admin".into(),
        };
        assert!(form.validate().is_err());
    }
}
