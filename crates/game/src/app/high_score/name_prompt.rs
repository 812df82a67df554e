pub(crate) const NAME_LENGTH: usize = 3;

/// Keeps ASCII letters and digits, uppercased. Length is not limited here.
pub(crate) fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

pub(crate) fn validate_name(raw: &str) -> Result<String, String> {
    let name = sanitize_name(raw);
    let length = name.chars().count();
    if length != NAME_LENGTH {
        return Err(format!(
            "name must be {NAME_LENGTH} letters or digits, got {length} from {raw:?}"
        ));
    }
    Ok(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PromptOutcome {
    Accepted(String),
    Rejected(String),
}

/// Text field state. Input is sanitized as it arrives and capped at
/// [`NAME_LENGTH`] characters, like a `maxlength` field.
#[derive(Debug, Clone, Default)]
pub(crate) struct NamePrompt {
    value: String,
    submitted: Option<String>,
}

impl NamePrompt {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn is_active(&self) -> bool {
        self.submitted.is_none()
    }

    pub(crate) fn input_text(&mut self, raw: &str) {
        if !self.is_active() {
            return;
        }
        for ch in sanitize_name(raw).chars() {
            if self.value.chars().count() >= NAME_LENGTH {
                break;
            }
            self.value.push(ch);
        }
    }

    /// Accepts only a full-length name; anything else leaves the prompt open.
    pub(crate) fn submit(&mut self) -> PromptOutcome {
        if let Some(name) = &self.submitted {
            return PromptOutcome::Accepted(name.clone());
        }
        match validate_name(&self.value) {
            Ok(name) => {
                self.submitted = Some(name.clone());
                PromptOutcome::Accepted(name)
            }
            Err(reason) => PromptOutcome::Rejected(reason),
        }
    }
}
