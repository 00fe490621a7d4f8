use crate::domain::EditorResult;

/// Places `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> EditorResult<()> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    Ok(())
}
