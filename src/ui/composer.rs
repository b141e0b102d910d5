/// Upper bound for the composer's height; taller drafts scroll inside it.
pub const MAX_COMPOSER_HEIGHT: f32 = 150.0;

const MIN_ROWS: usize = 1;

/// Message input with a height that follows its content.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    pub text: String,
}

impl Composer {
    pub fn draft(&self) -> &str {
        &self.text
    }

    pub fn has_sendable_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Rows the input should show for the current draft, capped so the
    /// result never exceeds [`MAX_COMPOSER_HEIGHT`] at `row_height`.
    pub fn desired_rows(&self, row_height: f32) -> usize {
        let max_rows = ((MAX_COMPOSER_HEIGHT / row_height.max(1.0)).floor() as usize).max(MIN_ROWS);
        let lines = self.text.split('\n').count();
        lines.clamp(MIN_ROWS, max_rows)
    }

    /// Empties the draft, which also shrinks the input back to one row.
    pub fn clear(&mut self) {
        self.text.clear();
    }
}
