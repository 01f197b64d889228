//! Signup and login screens. Presence checks only; nothing is stored.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Signup,
    Login,
    Dashboard,
}

impl Page {
    pub fn parse(raw: &str) -> Option<Page> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "signup" => Some(Page::Signup),
            "login" => Some(Page::Login),
            "dashboard" => Some(Page::Dashboard),
            _ => None,
        }
    }
}

/// A labelled text field on an auth form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input {
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
}

impl Input {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: false,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            secret: true,
            ..Self::new(label)
        }
    }

    /// What the form shows for this field.
    pub fn display(&self) -> String {
        if self.secret {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Ordered inputs plus the index that has focus.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthForm {
    pub inputs: Vec<Input>,
    pub focus: usize,
    next: Page,
}

impl AuthForm {
    pub fn signup() -> Self {
        Self {
            inputs: vec![Input::new("Name"), Input::new("Email"), Input::secret("Password")],
            focus: 0,
            next: Page::Login,
        }
    }

    pub fn login() -> Self {
        Self {
            inputs: vec![Input::new("Email"), Input::secret("Password")],
            focus: 0,
            next: Page::Dashboard,
        }
    }

    pub fn focus_next(&mut self, direction: isize) {
        let len = self.inputs.len() as isize;
        self.focus = (self.focus as isize + direction).rem_euclid(len) as usize;
    }

    pub fn focused_mut(&mut self) -> Option<&mut String> {
        self.inputs.get_mut(self.focus).map(|input| &mut input.value)
    }

    /// Page to navigate to when every field has content.
    pub fn submit(&self) -> Result<Page> {
        if self.inputs.iter().any(|input| input.value.is_empty()) {
            return Err(Error::MissingFields);
        }
        Ok(self.next)
    }

    pub fn reset(&mut self) {
        for input in &mut self.inputs {
            input.value.clear();
        }
        self.focus = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(form: &mut AuthForm, values: &[&str]) {
        for (input, value) in form.inputs.iter_mut().zip(values) {
            input.value = value.to_string();
        }
    }

    #[test]
    fn signup_needs_all_three_fields() {
        let mut form = AuthForm::signup();
        fill(&mut form, &["Ada", "ada@example.com", ""]);
        let err = form.submit().unwrap_err();
        assert!(matches!(err, Error::MissingFields));
        assert_eq!(err.to_string(), "Please fill in all fields");

        fill(&mut form, &["Ada", "ada@example.com", "hunter2"]);
        assert_eq!(form.submit().unwrap(), Page::Login);
    }

    #[test]
    fn login_leads_to_dashboard() {
        let mut form = AuthForm::login();
        assert!(form.submit().is_err());
        fill(&mut form, &["ada@example.com", "pw"]);
        assert_eq!(form.submit().unwrap(), Page::Dashboard);
    }

    #[test]
    fn passwords_are_masked() {
        let mut form = AuthForm::login();
        fill(&mut form, &["a@b.c", "secret"]);
        assert_eq!(form.inputs[0].display(), "a@b.c");
        assert_eq!(form.inputs[1].display(), "******");
    }

    #[test]
    fn focus_wraps() {
        let mut form = AuthForm::signup();
        form.focus_next(-1);
        assert_eq!(form.focus, 2);
        form.focus_next(1);
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn page_names() {
        assert_eq!(Page::parse("Dashboard"), Some(Page::Dashboard));
        assert_eq!(Page::parse("home"), None);
    }
}
