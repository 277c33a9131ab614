use super::Rgb8;

/// Resolves a color specification into 8-bit RGB.
///
/// `None` means "no color": the input was empty or `none`, or failed to parse.
/// Resolvers never fail hard; callers decide what "no color" means for them
/// (a missing stroke is suppressed, a missing fill becomes transparent).
pub trait ColorResolver {
    fn resolve(&self, spec: &str) -> Option<Rgb8>;
}

/// CSS color syntax (`red`, `#0f0`, `rgb(…)`, `hsl(…)`, …) via `csscolorparser`.
///
/// A fully transparent color (`transparent`, `#0000`, `rgba(…, 0)`) is
/// "no color". Any other parsed alpha is discarded; opacity is carried
/// separately by the scene records.
#[derive(Debug, Copy, Clone, Default)]
pub struct CssColorResolver;

impl ColorResolver for CssColorResolver {
    fn resolve(&self, spec: &str) -> Option<Rgb8> {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("none") {
            return None;
        }

        match csscolorparser::parse(spec) {
            Ok(c) => match c.to_rgba8() {
                [_, _, _, 0] => None,
                [r, g, b, _] => Some(Rgb8::new(r, g, b)),
            },
            Err(e) => {
                log::trace!("unparsable color {spec:?}: {e}");
                None
            }
        }
    }
}

impl<F> ColorResolver for F
where
    F: Fn(&str) -> Option<Rgb8>,
{
    fn resolve(&self, spec: &str) -> Option<Rgb8> {
        self(spec)
    }
}
