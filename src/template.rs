use serde::Serialize;
use tinytemplate::TinyTemplate;

/// Renders a reply template using `TinyTemplate`.
///
/// Template variables use the `{name}` syntax. Values are inserted verbatim:
/// replies are plain text with emoji and markdown markers, so no HTML
/// escaping is applied.
///
/// # Examples
///
/// ```
/// use ecochat::render_template;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Ctx { name: &'static str }
///
/// let out = render_template("Hai {name}! 👋", &Ctx { name: "Budi & Sari" }).unwrap();
/// assert_eq!(out, "Hai Budi & Sari! 👋");
/// ```
#[inline]
pub fn render_template<T: Serialize>(
    template: &str,
    ctx: &T,
) -> Result<String, tinytemplate::error::Error> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("tpl", template)?;
    tt.render("tpl", ctx)
}

#[cfg(test)]
mod tests {
    use super::render_template;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Ctx<'a> {
        text: &'a str,
    }

    #[test]
    fn renders_variable() {
        let out = render_template("Hello {text}", &Ctx { text: "world" }).unwrap();
        assert_eq!(out, "Hello world");
    }

    #[test]
    fn does_not_escape_markup() {
        let out = render_template("**{text}**", &Ctx { text: "<b>" }).unwrap();
        assert_eq!(out, "**<b>**");
    }

    #[test]
    fn unknown_field_is_an_error() {
        assert!(render_template("{missing}", &Ctx { text: "x" }).is_err());
    }
}
