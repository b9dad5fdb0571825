//! Composition of styled components over the style engine.
//!
//! A component is declared in two steps, `component(args)` then
//! `.style(template)`, or styled directly with `style(template)`. Non-template
//! calls go straight to the runtime through `passthrough`.

use crate::error::Result;
use crate::style::compiler::{CssCompiler, LightningCompiler};
use crate::style::engine::StyleEngine;
use crate::style::sink::{StyleBuffer, StyleSink};
use crate::style::token::{Interpolation, StyleToken};

/// The runtime that owns components and applies their styles.
pub trait StyledRuntime {
    /// Component construction arguments.
    type Args;
    /// Style state created for a component that is still waiting for its template.
    type Pending: Clone;
    type Output;

    fn create(&mut self, args: Self::Args) -> Self::Pending;

    /// Registers a (pending state, token) pair into shared composition state.
    fn set(&mut self, pending: Option<Self::Pending>, token: Option<StyleToken>);

    /// Builds a component; `None` finalizes the currently pending one.
    fn styled(&mut self, args: Option<Self::Args>) -> Self::Output;
}

pub struct Composer<'e, R, C = LightningCompiler, S = StyleBuffer>
where
    R: StyledRuntime,
{
    engine: &'e mut StyleEngine<C, S>,
    runtime: R,
    pending: Option<R::Pending>,
}

impl<'e, R, C, S> Composer<'e, R, C, S>
where
    R: StyledRuntime,
    C: CssCompiler,
    S: StyleSink,
{
    pub fn new(engine: &'e mut StyleEngine<C, S>, runtime: R) -> Self {
        Composer {
            engine,
            runtime,
            pending: None,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn into_runtime(self) -> R {
        self.runtime
    }

    /// Starts a component and returns a handle waiting for its style template.
    pub fn component(&mut self, args: R::Args) -> PendingComponent<'_, 'e, R, C, S> {
        let pending = self.runtime.create(args);
        self.runtime.set(Some(pending.clone()), None);
        self.pending = Some(pending);
        PendingComponent { composer: self }
    }

    /// Styles without component arguments.
    pub fn style(
        &mut self,
        fragments: &[&str],
        interpolations: Vec<Interpolation>,
    ) -> Result<&mut R> {
        self.pending = None;
        self.finish(fragments, interpolations)
    }

    /// Forwards a non-template call to the runtime unchanged.
    pub fn passthrough(&mut self, args: R::Args) -> R::Output {
        self.runtime.styled(Some(args))
    }

    fn finish(
        &mut self,
        fragments: &[&str],
        interpolations: Vec<Interpolation>,
    ) -> Result<&mut R> {
        let token = self.engine.css(fragments, interpolations)?;
        if self.pending.is_some() {
            let _ = self.runtime.styled(None);
        }
        self.runtime.set(self.pending.clone(), Some(token));
        Ok(&mut self.runtime)
    }
}

/// A component whose construction arguments are known but whose style is not.
pub struct PendingComponent<'c, 'e, R, C, S>
where
    R: StyledRuntime,
{
    composer: &'c mut Composer<'e, R, C, S>,
}

impl<'c, 'e, R, C, S> PendingComponent<'c, 'e, R, C, S>
where
    R: StyledRuntime,
    C: CssCompiler,
    S: StyleSink,
{
    pub fn style(
        self,
        fragments: &[&str],
        interpolations: Vec<Interpolation>,
    ) -> Result<&'c mut R> {
        let composer = self.composer;
        composer.finish(fragments, interpolations)
    }
}

/// Style state recorded for one component declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStyle {
    pub id: usize,
    pub args: Vec<String>,
}

/// In-memory runtime that records every registration.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    created: usize,
    entries: Vec<(Option<PendingStyle>, Option<StyleToken>)>,
    components: Vec<Option<Vec<String>>>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(Option<PendingStyle>, Option<StyleToken>)] {
        &self.entries
    }

    /// Arguments of every `styled` call; `None` marks a finalization.
    pub fn components(&self) -> &[Option<Vec<String>>] {
        &self.components
    }
}

impl StyledRuntime for RecordingRuntime {
    type Args = Vec<String>;
    type Pending = PendingStyle;
    type Output = usize;

    fn create(&mut self, args: Vec<String>) -> PendingStyle {
        self.created += 1;
        PendingStyle {
            id: self.created,
            args,
        }
    }

    fn set(&mut self, pending: Option<PendingStyle>, token: Option<StyleToken>) {
        self.entries.push((pending, token));
    }

    fn styled(&mut self, args: Option<Vec<String>>) -> usize {
        self.components.push(args);
        self.components.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::compiler::{CompileOptions, CompiledCss};

    struct EchoCompiler;

    impl CssCompiler for EchoCompiler {
        fn compile(
            &self,
            source: &str,
            _key: &str,
            _options: CompileOptions,
        ) -> Result<CompiledCss> {
            Ok(CompiledCss {
                css: source.to_string(),
                ..CompiledCss::default()
            })
        }
    }

    #[test]
    fn test_component_then_style() {
        let mut engine = StyleEngine::with_compiler(EchoCompiler);
        let mut composer = Composer::new(&mut engine, RecordingRuntime::new());

        composer
            .component(vec!["button".to_string()])
            .style(&[".root { color: red }"], Vec::new())
            .unwrap();

        let runtime = composer.into_runtime();
        let entries = runtime.entries();
        assert_eq!(entries.len(), 2);
        // `[pending]` on declaration, then `[pending, token]`.
        assert_eq!(entries[0].0.as_ref().map(|p| p.id), Some(1));
        assert!(entries[0].1.is_none());
        assert_eq!(entries[1].0.as_ref().map(|p| p.args.clone()), Some(vec!["button".to_string()]));
        assert!(entries[1].1.is_some());
        assert_eq!(runtime.components(), &[None]);
    }

    #[test]
    fn test_direct_style_has_no_pending_state() {
        let mut engine = StyleEngine::with_compiler(EchoCompiler);
        let mut composer = Composer::new(&mut engine, RecordingRuntime::new());

        composer.style(&[".root { margin: 0 }"], Vec::new()).unwrap();

        let runtime = composer.into_runtime();
        assert_eq!(runtime.entries().len(), 1);
        assert!(runtime.entries()[0].0.is_none());
        assert!(runtime.components().is_empty());
    }

    #[test]
    fn test_passthrough_skips_the_engine() {
        let mut engine = StyleEngine::with_compiler(EchoCompiler);
        {
            let mut composer = Composer::new(&mut engine, RecordingRuntime::new());
            assert_eq!(composer.passthrough(vec!["div".to_string()]), 1);
            assert!(composer.runtime().entries().is_empty());
        }
        assert!(engine.cache().is_empty());
    }
}
