//! Form collaborator: the editable bad/good form for one run
//!
//! Features:
//! - Field focus, typing, paste and checkbox handling
//! - Submit through the shared input rules
//! - Bad-interface traps (scrambled tab order, paste block, clear button,
//!   fake password reveal, wiping fields on rejection)
//!
//! The form only reports `FormSignal`s; the caller tags them with the run's
//! style and feeds them to the session.

use crate::tasks::rules::{
    self, EmailInput, MistakeReason, PasswordInput, ProfileInput, Submission, Violation,
};
use crate::tasks::{PresentationStyle, TaskType, CANONICAL_EMAIL, CANONICAL_PASSWORD};

/// First screen row used by form controls
pub const FORM_TOP: u16 = 5;
/// Rows taken by one control (label line + spacing)
pub const ROW_STRIDE: u16 = 2;

/// Every input the three missions use
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldId {
    Email,
    EmailConfirm,
    Password,
    PasswordConfirm,
    Terms,
    FamilyName,
    GivenName,
    PostalCode,
    Prefecture,
    City,
    Street,
    Phone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Secret,
    Checkbox,
}

/// One editable field
#[derive(Clone, Debug)]
pub struct Field {
    pub id: FieldId,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    pub paste_blocked: bool,
}

impl Field {
    fn new(id: FieldId, label: &'static str, kind: FieldKind) -> Self {
        Field {
            id,
            label,
            placeholder: "",
            kind,
            value: String::new(),
            checked: false,
            paste_blocked: false,
        }
    }

    fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    fn no_paste(mut self) -> Self {
        self.paste_blocked = true;
        self
    }
}

/// Buttons under the fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Submit,
    Clear,
    Reveal,
}

/// Anything that can take focus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Field(usize),
    Button(Button),
}

/// What the form tells the session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormSignal {
    Complete,
    Mistake(MistakeReason),
}

/// Message shown after a rejected action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Modal-style alert, how the bad interface reports
    Alert(&'static str),
    /// Inline hints next to fields, how the good interface reports
    Inline(Vec<Violation>),
}

/// Editable state of the form for one run
#[derive(Clone, Debug)]
pub struct FormState {
    task: TaskType,
    style: PresentationStyle,
    fields: Vec<Field>,
    /// Controls in screen order
    layout: Vec<Control>,
    /// Indices into `layout`, in tab order
    tab_order: Vec<usize>,
    focus: usize,
    reveal: bool,
    notice: Option<Notice>,
}

impl FormState {
    pub fn new(task: TaskType, style: PresentationStyle) -> Self {
        let fields = build_fields(task, style);
        let mut layout: Vec<Control> = (0..fields.len()).map(Control::Field).collect();

        match style {
            PresentationStyle::Bad => {
                layout.push(Control::Button(Button::Clear));
                layout.push(Control::Button(Button::Submit));
            }
            PresentationStyle::Good => layout.push(Control::Button(Button::Submit)),
        }
        if task == TaskType::Password {
            // Sits right after the password field in both variants
            layout.insert(1, Control::Button(Button::Reveal));
        }

        let mut tab_order: Vec<usize> = (0..layout.len()).collect();
        if style == PresentationStyle::Bad {
            scramble(&mut tab_order);
        }

        FormState {
            task,
            style,
            fields,
            layout,
            tab_order,
            focus: 0,
            reveal: false,
            notice: None,
        }
    }

    pub fn task(&self) -> TaskType {
        self.task
    }

    pub fn style(&self) -> PresentationStyle {
        self.style
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Controls in the order they are drawn, top to bottom
    pub fn layout(&self) -> &[Control] {
        &self.layout
    }

    pub fn focused(&self) -> Control {
        self.layout[self.tab_order[self.focus]]
    }

    pub fn is_revealed(&self) -> bool {
        self.reveal
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Screen row of the control at `layout` position `pos`
    pub fn row_of(pos: usize) -> u16 {
        FORM_TOP + ROW_STRIDE * pos as u16
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.tab_order.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.tab_order.len() - 1) % self.tab_order.len();
    }

    /// Focus whatever is drawn on `row`; returns the control hit
    pub fn click_row(&mut self, row: u16) -> Option<Control> {
        let pos = (0..self.layout.len()).find(|&pos| Self::row_of(pos) == row)?;
        self.focus = self.tab_order.iter().position(|&p| p == pos)?;
        Some(self.layout[pos])
    }

    /// Type one character into the focused field (space toggles checkboxes)
    pub fn type_char(&mut self, c: char) {
        if let Some(field) = self.focused_field_mut() {
            match field.kind {
                FieldKind::Checkbox if c == ' ' => field.checked = !field.checked,
                FieldKind::Checkbox => {}
                FieldKind::Text | FieldKind::Secret => field.value.push(c),
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_field_mut() {
            field.value.pop();
        }
    }

    /// Paste into the focused field; false when the field refused it
    pub fn paste(&mut self, text: &str) -> bool {
        let blocked = match self.focused_field_mut() {
            Some(field) if field.paste_blocked => true,
            Some(field) if field.kind != FieldKind::Checkbox => {
                field.value.push_str(text.trim_end_matches(['\r', '\n']));
                false
            }
            _ => return false,
        };
        if blocked {
            self.notice = Some(Notice::Alert("Paste disabled for security."));
        }
        !blocked
    }

    /// Enter on the focused control: buttons fire, checkboxes toggle,
    /// text fields submit on the good form and advance on the bad one
    pub fn activate(&mut self) -> Option<FormSignal> {
        match self.focused() {
            Control::Button(button) => self.press(button),
            Control::Field(idx) if self.fields[idx].kind == FieldKind::Checkbox => {
                self.fields[idx].checked = !self.fields[idx].checked;
                None
            }
            Control::Field(_) => match self.style {
                PresentationStyle::Good => Some(self.submit()),
                PresentationStyle::Bad => {
                    self.focus_next();
                    None
                }
            },
        }
    }

    pub fn press(&mut self, button: Button) -> Option<FormSignal> {
        match (button, self.style) {
            (Button::Submit, _) => Some(self.submit()),
            (Button::Clear, _) => {
                for field in &mut self.fields {
                    field.value.clear();
                    field.checked = false;
                }
                self.notice = None;
                Some(FormSignal::Mistake(Violation::FormCleared.into()))
            }
            (Button::Reveal, PresentationStyle::Bad) => {
                self.notice = Some(Notice::Alert(
                    "SECURITY ALERT: displaying passwords on screen is prohibited by IT policy.",
                ));
                Some(FormSignal::Mistake(Violation::RevealForbidden.into()))
            }
            (Button::Reveal, PresentationStyle::Good) => {
                self.reveal = !self.reveal;
                None
            }
        }
    }

    /// Check the form against the rules of this interface
    pub fn submit(&mut self) -> FormSignal {
        let submission = self.submission();
        match rules::validate(self.style, &submission) {
            Ok(()) => {
                self.notice = None;
                FormSignal::Complete
            }
            Err(reason) => {
                self.after_rejection(&reason);
                FormSignal::Mistake(reason)
            }
        }
    }

    /// Snapshot of the fields as the rules see them
    pub fn submission(&self) -> Submission {
        let value = |id| {
            self.field(id)
                .map(|f| f.value.clone())
                .unwrap_or_default()
        };
        match self.task {
            TaskType::Email => Submission::Email(EmailInput {
                address: value(FieldId::Email),
                confirmation: value(FieldId::EmailConfirm),
            }),
            TaskType::Password => Submission::Password(PasswordInput {
                password: value(FieldId::Password),
                confirmation: value(FieldId::PasswordConfirm),
                terms_accepted: self.field(FieldId::Terms).map_or(false, |f| f.checked),
            }),
            TaskType::Profile => Submission::Profile(ProfileInput {
                family_name: value(FieldId::FamilyName),
                given_name: value(FieldId::GivenName),
                postal_code: value(FieldId::PostalCode),
                prefecture: value(FieldId::Prefecture),
                city: value(FieldId::City),
                street: value(FieldId::Street),
                phone: value(FieldId::Phone),
            }),
        }
    }

    fn after_rejection(&mut self, reason: &MistakeReason) {
        match self.style {
            PresentationStyle::Good => {
                self.notice = Some(Notice::Inline(reason.violations().to_vec()));
            }
            PresentationStyle::Bad => {
                let primary = reason.primary();
                match primary {
                    Violation::PasswordTooShort | Violation::PasswordMismatch => {
                        self.clear_field(FieldId::Password);
                        self.clear_field(FieldId::PasswordConfirm);
                    }
                    Violation::PasswordConfirmationMismatch => {
                        self.clear_field(FieldId::PasswordConfirm)
                    }
                    _ => {}
                }
                self.notice = Some(Notice::Alert(bad_alert(primary)));
            }
        }
    }

    fn clear_field(&mut self, id: FieldId) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.id == id) {
            field.value.clear();
        }
    }

    fn focused_field_mut(&mut self) -> Option<&mut Field> {
        match self.focused() {
            Control::Field(idx) => self.fields.get_mut(idx),
            Control::Button(_) => None,
        }
    }
}

/// Cryptic alert text the bad interface shows for a violation
pub fn bad_alert(violation: Violation) -> &'static str {
    match violation {
        Violation::MissingAtSign => "System Error: Invalid format 0x0001",
        Violation::AddressMismatch => "Verification Failed: Input does not match expected record.",
        Violation::EmailConfirmationMismatch => "Error: Emails do not match.",
        Violation::PasswordTooShort | Violation::PasswordMismatch => {
            "PASSWORD REJECTED: Policy violation or incorrect string."
        }
        Violation::PasswordConfirmationMismatch => "Confirmation Mismatch.",
        Violation::TermsNotAccepted => "Error: You must accept the mandatory terms.",
        Violation::NullValue | Violation::MissingName | Violation::IncompleteAddress => {
            "NULL VALUE DETECTED."
        }
        Violation::PhoneNotDigitsOnly => "Format Error: Numbers only allowed in DB column.",
        Violation::PostalCodeMissing => "Zip Code Missing",
        Violation::InvalidPostalCode | Violation::InvalidPhone | Violation::Rejected => {
            "ERR_RECORD_REJECTED (code 17)"
        }
        Violation::FormCleared => "Form cleared.",
        Violation::RevealForbidden => {
            "SECURITY ALERT: displaying passwords on screen is prohibited by IT policy."
        }
    }
}

fn build_fields(task: TaskType, style: PresentationStyle) -> Vec<Field> {
    use FieldKind::{Checkbox, Secret, Text};
    let bad = style == PresentationStyle::Bad;

    match task {
        TaskType::Email if bad => vec![
            Field::new(FieldId::Email, "E-Mail Addr", Text).placeholder("user(at)domain(dot)com"),
            Field::new(FieldId::EmailConfirm, "Re-Enter", Text).no_paste(),
        ],
        TaskType::Email => vec![
            Field::new(FieldId::Email, "Email address", Text).placeholder(CANONICAL_EMAIL),
            Field::new(FieldId::EmailConfirm, "Confirm email address", Text)
                .placeholder(CANONICAL_EMAIL),
        ],
        TaskType::Password if bad => vec![
            Field::new(FieldId::Password, "PW", Secret),
            Field::new(FieldId::PasswordConfirm, "PW (again)", Secret),
            Field::new(
                FieldId::Terms,
                "REQUIRED: I agree to receive marketing emails, third-party offers and daily newsletters",
                Checkbox,
            ),
        ],
        TaskType::Password => vec![
            Field::new(FieldId::Password, "Password (8+ characters)", Secret)
                .placeholder(CANONICAL_PASSWORD),
            Field::new(FieldId::PasswordConfirm, "Confirm password", Secret),
        ],
        TaskType::Profile if bad => vec![
            Field::new(FieldId::GivenName, "NAME_1", Text),
            Field::new(FieldId::Phone, "TEL (numbers)", Text).placeholder("09012345678"),
            Field::new(FieldId::Street, "ADDR_3", Text),
            Field::new(FieldId::FamilyName, "NAME_2", Text),
            Field::new(FieldId::PostalCode, "ZIP", Text),
            Field::new(FieldId::City, "ADDR_2", Text),
            Field::new(FieldId::Prefecture, "ADDR_1", Text),
        ],
        TaskType::Profile => vec![
            Field::new(FieldId::FamilyName, "Family name", Text).placeholder("Yamada"),
            Field::new(FieldId::GivenName, "Given name", Text).placeholder("Taro"),
            Field::new(FieldId::Phone, "Phone", Text).placeholder("090-1234-5678"),
            Field::new(FieldId::PostalCode, "Postal code", Text).placeholder("123-4567"),
            Field::new(FieldId::Prefecture, "Prefecture", Text).placeholder("Tokyo"),
            Field::new(FieldId::City, "City", Text).placeholder("Shinjuku"),
            Field::new(FieldId::Street, "Street", Text).placeholder("1-1"),
        ],
    }
}

// Deterministic zig-zag: last, first, second-to-last, second, ...
fn scramble(order: &mut Vec<usize>) {
    let mut scrambled = Vec::with_capacity(order.len());
    let (mut lo, mut hi) = (0usize, order.len());
    while lo < hi {
        hi -= 1;
        scrambled.push(order[hi]);
        if lo < hi {
            scrambled.push(order[lo]);
            lo += 1;
        }
    }
    *order = scrambled;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(form: &mut FormState, id: FieldId, text: &str) {
        let pos = form
            .layout()
            .iter()
            .position(|c| matches!(c, Control::Field(i) if form.fields()[*i].id == id))
            .unwrap();
        form.click_row(FormState::row_of(pos)).unwrap();
        for c in text.chars() {
            form.type_char(c);
        }
    }

    #[test]
    fn test_email_without_at_is_a_mistake_not_a_completion() {
        for style in [PresentationStyle::Bad, PresentationStyle::Good] {
            let mut form = FormState::new(TaskType::Email, style);
            fill(&mut form, FieldId::Email, "taro.yamada.example.com");
            match form.submit() {
                FormSignal::Mistake(reason) => {
                    assert_eq!(reason.primary(), Violation::MissingAtSign)
                }
                FormSignal::Complete => panic!("completed without @"),
            }
        }
    }

    #[test]
    fn test_canonical_email_completes() {
        for style in [PresentationStyle::Bad, PresentationStyle::Good] {
            let mut form = FormState::new(TaskType::Email, style);
            fill(&mut form, FieldId::Email, CANONICAL_EMAIL);
            fill(&mut form, FieldId::EmailConfirm, CANONICAL_EMAIL);
            assert_eq!(form.submit(), FormSignal::Complete);
            assert!(form.notice().is_none());
        }
    }

    #[test]
    fn test_bad_confirmation_refuses_paste() {
        let mut form = FormState::new(TaskType::Email, PresentationStyle::Bad);
        fill(&mut form, FieldId::EmailConfirm, "");
        assert!(!form.paste(CANONICAL_EMAIL));
        assert_eq!(form.field(FieldId::EmailConfirm).unwrap().value, "");
        assert!(matches!(form.notice(), Some(Notice::Alert(_))));

        let mut good = FormState::new(TaskType::Email, PresentationStyle::Good);
        fill(&mut good, FieldId::EmailConfirm, "");
        assert!(good.paste(CANONICAL_EMAIL));
    }

    #[test]
    fn test_bad_password_rejection_wipes_fields() {
        let mut form = FormState::new(TaskType::Password, PresentationStyle::Bad);
        fill(&mut form, FieldId::Password, "M3@zP7$x");
        fill(&mut form, FieldId::PasswordConfirm, "M3@zP7$x");
        assert!(matches!(form.submit(), FormSignal::Mistake(_)));
        assert_eq!(form.field(FieldId::Password).unwrap().value, "");
        assert_eq!(form.field(FieldId::PasswordConfirm).unwrap().value, "");
        assert_eq!(
            form.notice(),
            Some(&Notice::Alert(
                "PASSWORD REJECTED: Policy violation or incorrect string."
            ))
        );
    }

    #[test]
    fn test_bad_password_needs_terms() {
        let mut form = FormState::new(TaskType::Password, PresentationStyle::Bad);
        fill(&mut form, FieldId::Password, CANONICAL_PASSWORD);
        fill(&mut form, FieldId::PasswordConfirm, CANONICAL_PASSWORD);
        assert_eq!(
            form.submit(),
            FormSignal::Mistake(Violation::TermsNotAccepted.into())
        );
        fill(&mut form, FieldId::Terms, " ");
        assert_eq!(form.submit(), FormSignal::Complete);
    }

    #[test]
    fn test_reveal_button() {
        let mut bad = FormState::new(TaskType::Password, PresentationStyle::Bad);
        assert_eq!(
            bad.press(Button::Reveal),
            Some(FormSignal::Mistake(Violation::RevealForbidden.into()))
        );
        assert!(!bad.is_revealed());

        let mut good = FormState::new(TaskType::Password, PresentationStyle::Good);
        assert_eq!(good.press(Button::Reveal), None);
        assert!(good.is_revealed());
    }

    #[test]
    fn test_clear_button_wipes_and_counts() {
        let mut form = FormState::new(TaskType::Profile, PresentationStyle::Bad);
        fill(&mut form, FieldId::FamilyName, "Yamada");
        assert_eq!(
            form.press(Button::Clear),
            Some(FormSignal::Mistake(Violation::FormCleared.into()))
        );
        assert!(form.fields().iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_good_profile_reports_every_field() {
        let mut form = FormState::new(TaskType::Profile, PresentationStyle::Good);
        fill(&mut form, FieldId::FamilyName, "Yamada");
        fill(&mut form, FieldId::Phone, "abc");
        let signal = form.submit();
        let FormSignal::Mistake(reason) = signal else {
            panic!("incomplete profile completed");
        };
        assert!(reason.violations().contains(&Violation::MissingName));
        assert!(reason.violations().contains(&Violation::InvalidPhone));
        assert!(reason.violations().contains(&Violation::InvalidPostalCode));
        assert!(reason.violations().contains(&Violation::IncompleteAddress));
        assert!(matches!(form.notice(), Some(Notice::Inline(v)) if v.len() == 4));
    }

    #[test]
    fn test_bad_tab_order_is_scrambled_but_complete() {
        let form = FormState::new(TaskType::Profile, PresentationStyle::Bad);
        let mut seen = form.tab_order.clone();
        assert_ne!(seen, (0..form.layout().len()).collect::<Vec<_>>());
        seen.sort_unstable();
        assert_eq!(seen, (0..form.layout().len()).collect::<Vec<_>>());

        let good = FormState::new(TaskType::Profile, PresentationStyle::Good);
        assert_eq!(good.focused(), Control::Field(0));
    }

    #[test]
    fn test_enter_on_good_field_submits() {
        let mut form = FormState::new(TaskType::Email, PresentationStyle::Good);
        fill(&mut form, FieldId::Email, CANONICAL_EMAIL);
        fill(&mut form, FieldId::EmailConfirm, CANONICAL_EMAIL);
        assert_eq!(form.activate(), Some(FormSignal::Complete));
    }

    #[test]
    fn test_click_row_outside_form_hits_nothing() {
        let mut form = FormState::new(TaskType::Email, PresentationStyle::Good);
        assert_eq!(form.click_row(0), None);
        assert_eq!(form.click_row(FORM_TOP + 1), None);
    }
}
