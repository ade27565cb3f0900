use serde::Serialize;
use shared::forms::FormErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Text,
    Date,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// One rendered form input with its current value and validation messages.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub required: bool,
    pub value: String,
    pub choices: Vec<Choice>,
    pub errors: Vec<String>,
}

impl FieldView {
    pub(crate) fn text(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, Widget::Text, true, value)
    }

    pub(crate) fn date(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, Widget::Date, false, value)
    }

    pub(crate) fn select(
        name: &'static str,
        label: &'static str,
        required: bool,
        value: &str,
        options: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut field = Self::new(name, label, Widget::Select, required, value);
        field.choices = options
            .into_iter()
            .map(|(option, label)| Choice {
                selected: option == value,
                value: option,
                label,
            })
            .collect();
        field
    }

    fn new(
        name: &'static str,
        label: &'static str,
        widget: Widget,
        required: bool,
        value: &str,
    ) -> Self {
        Self {
            name,
            label,
            widget,
            required,
            value: value.to_string(),
            choices: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// A create or update form, optionally bound to the record being edited.
#[derive(Debug, Clone, Serialize)]
pub struct FormPage<R> {
    pub record: Option<R>,
    pub fields: Vec<FieldView>,
    pub has_errors: bool,
}

impl<R> FormPage<R> {
    pub(crate) fn new(record: Option<R>, mut fields: Vec<FieldView>, errors: &FormErrors) -> Self {
        for field in &mut fields {
            field.errors = errors.messages(field.name).to_vec();
        }
        Self {
            record,
            fields,
            has_errors: !errors.is_empty(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Outcome of a form submission that reached the store.
#[derive(Debug, Clone)]
pub enum Submission<R> {
    Saved(R),
    Rejected(FormPage<R>),
}
