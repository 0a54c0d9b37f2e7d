// `{name}` placeholder rendering over a closed variable set

/// Values available to subject and body templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    pub company: String,
    pub person: String,
    pub time: String,
    pub part: String,
    pub detail: String,
}

impl TemplateVars {
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "company" => Some(&self.company),
            "person" => Some(&self.person),
            "time" => Some(&self.time),
            "part" => Some(&self.part),
            "detail" => Some(&self.detail),
            _ => None,
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Substitute every `{name}` in one left-to-right pass.
///
/// Unknown names render as an empty string. Braces that do not enclose a
/// word are copied literally. Substituted text is never scanned again.
pub fn render_template(template: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let name_len = after
            .char_indices()
            .find(|(_, c)| !is_name_char(*c))
            .map_or(after.len(), |(i, _)| i);

        if name_len > 0 && after[name_len..].starts_with('}') {
            out.push_str(vars.get(&after[..name_len]).unwrap_or_default());
            rest = &after[name_len + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars {
        TemplateVars {
            company: "A造船".to_string(),
            person: "山田 太郎".to_string(),
            time: "2026-10-18 09:05".to_string(),
            part: "左腕".to_string(),
            detail: "（追記なし）".to_string(),
        }
    }

    #[test]
    fn test_renders_known_placeholders() {
        assert_eq!(
            render_template("[命をツナグ] {company} {person} - 出血", &vars()),
            "[命をツナグ] A造船 山田 太郎 - 出血"
        );
        assert_eq!(render_template("{part}に痛み @ {time}", &vars()), "左腕に痛み @ 2026-10-18 09:05");
    }

    #[test]
    fn test_unknown_placeholder_renders_empty() {
        assert_eq!(render_template("a{floor}b", &vars()), "ab");
    }

    #[test]
    fn test_non_word_braces_are_literal() {
        assert_eq!(render_template("{ company } {} {{person}}", &vars()), "{ company } {} {山田 太郎}");
        assert_eq!(render_template("trailing {", &vars()), "trailing {");
        assert_eq!(render_template("{unclosed", &vars()), "{unclosed");
        assert_eq!(render_template("{社名}", &vars()), "{社名}");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let mut values = vars();
        values.detail = "{person}".to_string();
        assert_eq!(render_template("状況：{detail}", &values), "状況：{person}");
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(render_template("", &vars()), "");
    }
}
