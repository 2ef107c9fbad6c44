use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 256;

#[derive(Debug, Clone, serde::Serialize)]
pub struct FullName(String);

impl FullName {
    pub fn parse(name: String) -> Result<FullName, String> {
        let is_empty_or_whitespace = name.trim().is_empty();
        let is_too_long = name.graphemes(true).count() > MAX_CHAR_LENGHT;

        if is_empty_or_whitespace || is_too_long {
            return Err(format!("{} is not a valid name", name));
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
