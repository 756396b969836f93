//! Terminal front of the product naming flow.

use crate::product::{NamingDialog, ProductManager, SimilarChoice, Suggestion};
use capture::ProductLabelProvider;
use std::io::{self, BufRead, Stdin, Stdout, Write};

/// Line-oriented questions over any reader / writer pair
pub struct TerminalDialog<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalDialog<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, text: &str) {
        let _ = writeln!(self.output, "{}", text);
    }

    /// Prints `question` and reads one trimmed line; `None` at end of input.
    fn ask(&mut self, question: &str) -> Option<String> {
        let _ = write!(self.output, "{} ", question);
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn ask_yes_no(&mut self, question: &str) -> bool {
        self.ask(&format!("{} [y/N]", question))
            .is_some_and(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

fn version_info(versions: &[String]) -> String {
    if versions.is_empty() {
        "First recording".to_string()
    } else {
        format!("Existing versions: {}", versions.join(", "))
    }
}

impl<R: BufRead, W: Write> NamingDialog for TerminalDialog<R, W> {
    fn confirm_version(&mut self, product: &str, versions: &[String], next_label: &str) -> bool {
        self.say(&format!("Product: {}", product));
        self.say(&version_info(versions));
        self.say(&format!("New version will be: {}", next_label));
        self.ask_yes_no("Continue?")
    }

    fn choose_similar(&mut self, name: &str, suggestions: &[Suggestion]) -> SimilarChoice {
        self.say(&format!("Products similar to '{}':", name));
        for (index, suggestion) in suggestions.iter().enumerate() {
            let versions = if suggestion.versions.is_empty() {
                "new".to_string()
            } else {
                suggestion.versions.join(", ")
            };
            self.say(&format!("  {}) {} ({})", index + 1, suggestion.product, versions));
        }

        let question = format!(
            "Number to record that product, 'n' to create '{}', empty to cancel:",
            name
        );
        loop {
            let Some(answer) = self.ask(&question) else {
                return SimilarChoice::Cancel;
            };
            if answer.is_empty() {
                return SimilarChoice::Cancel;
            }
            if answer.eq_ignore_ascii_case("n") {
                return SimilarChoice::NewProduct;
            }
            if let Ok(number) = answer.parse::<usize>()
                && let Some(suggestion) = number.checked_sub(1).and_then(|i| suggestions.get(i))
            {
                return SimilarChoice::Existing(suggestion.product.clone());
            }
            self.say(&format!("'{}' is not one of the options", answer));
        }
    }

    fn confirm_new(&mut self, name: &str) -> bool {
        self.ask_yes_no(&format!("'{}' will be a new product. Continue?", name))
    }
}

/// Asks the operator for a product on the terminal and resolves it into a
/// versioned label. An empty name cancels.
pub struct TerminalPrompt<'a, R, W> {
    products: &'a mut ProductManager,
    dialog: TerminalDialog<R, W>,
}

impl<'a> TerminalPrompt<'a, io::StdinLock<'static>, Stdout> {
    pub fn stdio(products: &'a mut ProductManager) -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(products, TerminalDialog::new(stdin.lock(), io::stdout()))
    }
}

impl<'a, R: BufRead, W: Write> TerminalPrompt<'a, R, W> {
    pub fn new(products: &'a mut ProductManager, dialog: TerminalDialog<R, W>) -> Self {
        Self { products, dialog }
    }

    pub fn into_dialog(self) -> TerminalDialog<R, W> {
        self.dialog
    }
}

impl<R: BufRead, W: Write> ProductLabelProvider for TerminalPrompt<'_, R, W> {
    fn request_label(&mut self) -> Option<String> {
        let name = self.dialog.ask("Product name to record (empty to cancel):")?;
        if name.is_empty() {
            return None;
        }
        self.products.resolve_label(&name, &mut self.dialog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::{LogLevel, Logger};
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn dialog(input: &str) -> TerminalDialog<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalDialog::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_yes_no_defaults_to_no() {
        assert!(dialog("y\n").ask_yes_no("ok?"));
        assert!(dialog("YES\n").ask_yes_no("ok?"));
        assert!(!dialog("\n").ask_yes_no("ok?"));
        assert!(!dialog("").ask_yes_no("ok?"));
    }

    #[test]
    fn test_choose_similar_reprompts_on_bad_input() {
        let suggestions = vec![
            Suggestion {
                product: "cola".to_string(),
                versions: vec!["v1".to_string()],
            },
            Suggestion {
                product: "cola_zero".to_string(),
                versions: Vec::new(),
            },
        ];
        let mut d = dialog("7\nabc\n2\n");
        assert_eq!(
            d.choose_similar("colaa", &suggestions),
            SimilarChoice::Existing("cola_zero".to_string())
        );
        let printed = String::from_utf8(d.into_output()).unwrap();
        assert!(printed.contains("1) cola (v1)"));
        assert!(printed.contains("2) cola_zero (new)"));
        assert!(printed.contains("'7' is not one of the options"));

        assert_eq!(dialog("N\n").choose_similar("x", &suggestions), SimilarChoice::NewProduct);
        assert_eq!(dialog("\n").choose_similar("x", &suggestions), SimilarChoice::Cancel);
        assert_eq!(dialog("").choose_similar("x", &suggestions), SimilarChoice::Cancel);
    }

    #[test]
    fn test_prompt_creates_new_product() {
        let dir = tempdir().unwrap();
        let logger = Logger::detached(LogLevel::Error, false);
        let mut products = ProductManager::new(dir.path().join("products.json"), dir.path(), &logger);

        let mut prompt = TerminalPrompt::new(&mut products, dialog("Orange Juice\ny\n"));
        assert_eq!(prompt.request_label().as_deref(), Some("orange_juice_v1"));
        assert_eq!(products.products(), ["orange_juice".to_string()]);
        assert!(fs::read_to_string(dir.path().join("products.json"))
            .unwrap()
            .contains("orange_juice"));
    }

    #[test]
    fn test_prompt_empty_name_cancels() {
        let dir = tempdir().unwrap();
        let logger = Logger::detached(LogLevel::Error, false);
        let mut products = ProductManager::new(dir.path().join("products.json"), dir.path(), &logger);

        let mut prompt = TerminalPrompt::new(&mut products, dialog("\n"));
        assert_eq!(prompt.request_label(), None);
        let mut prompt = TerminalPrompt::new(&mut products, dialog(""));
        assert_eq!(prompt.request_label(), None);
        assert!(products.products().is_empty());
    }
}
