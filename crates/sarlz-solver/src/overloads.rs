//! Default-value overload synthesis.
//!
//! An action whose parameters carry default values is callable with any
//! subset of those parameters omitted. For `k` default-valued parameters the
//! synthesizer emits the `2^k - 1` delegating overloads besides the declared
//! (canonical) one. Each overload has a projected signature (the
//! non-omitted parameters, in order) and an argument plan for the delegation
//! to the canonical action: forwarded parameters by name, omitted ones by
//! their default expression.
//!
//! ## Enumeration order
//!
//! Overloads are produced by increasing retained-defaults mask, where the
//! first default-valued parameter is the most significant bit. For
//! `(a = .., b = .., rest*)` this yields `(rest)`, `(b, rest)`, `(a, rest)`.
//!
//! A variadic parameter is never omitted.

use crate::defaults::{DefaultExpression, default_expression_for};
use crate::prototype::{
    ActionParameterTypes, ActionPrototype, DefaultValueId, ParameterSpec, Signature,
};
use crate::types::{Expr, Name};
use rustc_hash::FxHashMap;
use sarlz_common::diagnostics::{Diagnostic, diagnostic_codes};
use sarlz_common::limits;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use tracing::{debug, trace};

/// Positions of the canonical signature omitted by one overload, ascending.
pub type OmittedSet = SmallVec<[usize; 8]>;

// =============================================================================
// Options and errors
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthesisOptions {
    /// Upper bound on default-valued parameters per action. Values above
    /// [`limits::MAX_DEFAULT_PARAMETERS_CEILING`] are clamped.
    pub max_default_parameters: u32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            max_default_parameters: limits::MAX_DEFAULT_PARAMETERS,
        }
    }
}

impl SynthesisOptions {
    fn effective_max(&self) -> u32 {
        self.max_default_parameters
            .min(limits::MAX_DEFAULT_PARAMETERS_CEILING)
    }
}

/// Two omission subsets that project onto the same erased parameter types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error(
    "default values of ({signature}) produce the overload ({parameter_types}) twice \
     (omitting {first:?} and {second:?})"
)]
pub struct DuplicateOverloadError {
    /// Erased types of the canonical signature.
    pub signature: ActionParameterTypes,
    /// The colliding projection.
    pub parameter_types: ActionParameterTypes,
    pub first: OmittedSet,
    pub second: OmittedSet,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Duplicate(#[from] DuplicateOverloadError),
    #[error("({signature}) declares {count} default-valued parameters; at most {max} are supported")]
    TooManyDefaultParameters {
        signature: ActionParameterTypes,
        count: usize,
        max: u32,
    },
}

impl SynthesisError {
    pub const fn code(&self) -> u32 {
        match self {
            Self::Duplicate(_) => diagnostic_codes::DUPLICATE_SYNTHESIZED_OVERLOAD,
            Self::TooManyDefaultParameters { .. } => diagnostic_codes::TOO_MANY_DEFAULT_PARAMETERS,
        }
    }

    /// Report this error against the declaration of `action`.
    pub fn to_diagnostic(&self, action: &str, file: &str, start: u32, length: u32) -> Diagnostic {
        match self {
            Self::Duplicate(err) => {
                let declared = format!("{action}({})", err.signature);
                let overload = format!("{action}({})", err.parameter_types);
                Diagnostic::from_code(
                    file.to_string(),
                    start,
                    length,
                    self.code(),
                    &[declared.as_str(), overload.as_str()],
                )
                .with_related(
                    file.to_string(),
                    start,
                    length,
                    format!(
                        "Omitting the parameters at {:?} or at {:?} both give '{overload}'.",
                        err.first.as_slice(),
                        err.second.as_slice()
                    ),
                )
            }
            Self::TooManyDefaultParameters {
                signature,
                count,
                max,
            } => {
                let declared = format!("{action}({signature})");
                let count = count.to_string();
                let max = max.to_string();
                Diagnostic::from_code(
                    file.to_string(),
                    start,
                    length,
                    self.code(),
                    &[declared.as_str(), count.as_str(), max.as_str()],
                )
            }
        }
    }
}

// =============================================================================
// Output model
// =============================================================================

/// One argument of the delegating call to the canonical action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Argument {
    /// The overload's own parameter, passed through.
    Forward { position: usize, name: Name },
    /// An omitted parameter.
    Default {
        position: usize,
        name: Name,
        /// Canonical default of the parameter type.
        value: DefaultExpression,
        /// The expression written in the declaration, if known.
        #[serde(skip_serializing_if = "Option::is_none")]
        declared: Option<Expr>,
        /// Member holding the declared default value.
        #[serde(skip_serializing_if = "Option::is_none")]
        default_id: Option<DefaultValueId>,
    },
}

impl Argument {
    pub const fn position(&self) -> usize {
        match self {
            Self::Forward { position, .. } | Self::Default { position, .. } => *position,
        }
    }

    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default { .. })
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward { name, .. } => f.write_str(name),
            Self::Default { value, .. } => write!(f, "{}", value.expr),
        }
    }
}

/// Arguments of the delegating call, one per canonical parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArgumentPlan {
    pub arguments: Vec<Argument>,
}

impl fmt::Display for ArgumentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// A synthesized overload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overload {
    pub signature: Signature,
    pub parameter_types: ActionParameterTypes,
    pub plan: ArgumentPlan,
    pub omitted: OmittedSet,
    /// Identity of the canonical action this overload delegates to.
    pub uses_defaults_from: ActionParameterTypes,
}

/// The canonical declaration and all overloads implied by its defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverloadSet<B> {
    pub canonical: Signature,
    /// Identity annotated on the canonical action as holder of the defaults.
    pub source_of_defaults: ActionParameterTypes,
    #[serde(skip)]
    pub body: B,
    pub overloads: Vec<Overload>,
}

impl<B> OverloadSet<B> {
    pub fn len(&self) -> usize {
        self.overloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// Prototypes of the canonical action followed by every overload.
    pub fn prototypes(&self, action: &str) -> Vec<ActionPrototype> {
        std::iter::once(self.source_of_defaults.clone())
            .chain(self.overloads.iter().map(|o| o.parameter_types.clone()))
            .map(|params| ActionPrototype::new(action, params))
            .collect()
    }
}

// =============================================================================
// Synthesizer
// =============================================================================

/// Identifies the declaring action, for default-value identifiers.
#[derive(Clone, Copy, Debug)]
struct ActionOrigin<'a> {
    owner: &'a str,
    action: &'a str,
}

#[derive(Clone, Debug, Default)]
pub struct OverloadSynthesizer {
    options: SynthesisOptions,
}

impl OverloadSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SynthesisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Synthesize the overloads of `signature`.
    pub fn synthesize<B>(
        &self,
        signature: &Signature,
        body: B,
    ) -> Result<OverloadSet<B>, SynthesisError> {
        self.synthesize_inner(signature, body, None)
    }

    /// Like [`synthesize`](Self::synthesize), also naming the members that
    /// hold the declared default values of `owner.action`.
    pub fn synthesize_action<B>(
        &self,
        owner: &str,
        action: &str,
        signature: &Signature,
        body: B,
    ) -> Result<OverloadSet<B>, SynthesisError> {
        self.synthesize_inner(signature, body, Some(ActionOrigin { owner, action }))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(params = signature.len()))]
    fn synthesize_inner<B>(
        &self,
        signature: &Signature,
        body: B,
        origin: Option<ActionOrigin<'_>>,
    ) -> Result<OverloadSet<B>, SynthesisError> {
        let source_of_defaults = signature.parameter_types();
        let defaults = signature.default_positions();
        let k = defaults.len();

        let max = self.options.effective_max();
        if k > max as usize {
            return Err(SynthesisError::TooManyDefaultParameters {
                signature: source_of_defaults,
                count: k,
                max,
            });
        }

        let full: u32 = (1u32 << k) - 1;
        let mut overloads: Vec<Overload> = Vec::with_capacity(full as usize);
        let mut seen: FxHashMap<ActionParameterTypes, usize> = FxHashMap::default();

        // Bit `j` of `retained` keeps `defaults[k - 1 - j]`.
        for retained in 0..full {
            let omitted: OmittedSet = defaults
                .iter()
                .enumerate()
                .filter(|&(i, _)| retained & (1 << (k - 1 - i)) == 0)
                .map(|(_, &position)| position)
                .collect();

            let overload = project(signature, &omitted, &source_of_defaults, origin);
            trace!(
                omitted = ?omitted,
                parameter_types = %overload.parameter_types,
                plan = %overload.plan,
                "overload"
            );

            if let Some(&index) = seen.get(&overload.parameter_types) {
                let first = &overloads[index];
                return Err(DuplicateOverloadError {
                    signature: source_of_defaults,
                    parameter_types: overload.parameter_types,
                    first: first.omitted.clone(),
                    second: omitted,
                }
                .into());
            }
            seen.insert(overload.parameter_types.clone(), overloads.len());
            overloads.push(overload);
        }

        debug!(
            source_of_defaults = %source_of_defaults,
            defaults = k,
            overloads = overloads.len(),
            "overloads synthesized"
        );
        Ok(OverloadSet {
            canonical: signature.clone(),
            source_of_defaults,
            body,
            overloads,
        })
    }
}

fn project(
    canonical: &Signature,
    omitted: &[usize],
    source_of_defaults: &ActionParameterTypes,
    origin: Option<ActionOrigin<'_>>,
) -> Overload {
    let mut params: SmallVec<[ParameterSpec; 4]> = SmallVec::new();
    let mut arguments = Vec::with_capacity(canonical.len());

    for (position, param) in canonical.params().iter().enumerate() {
        if omitted.contains(&position) {
            arguments.push(Argument::Default {
                position,
                name: param.name.clone(),
                value: default_expression_for(&param.ty),
                declared: param.default_value.clone(),
                default_id: origin.map(|o| DefaultValueId::new(o.owner, o.action, position)),
            });
        } else {
            arguments.push(Argument::Forward {
                position,
                name: param.name.clone(),
            });
            params.push(ParameterSpec {
                has_default_value: false,
                default_value: None,
                ..param.clone()
            });
        }
    }

    let signature = Signature::from_validated(params);
    Overload {
        parameter_types: signature.parameter_types(),
        signature,
        plan: ArgumentPlan { arguments },
        omitted: omitted.iter().copied().collect(),
        uses_defaults_from: source_of_defaults.clone(),
    }
}

#[cfg(test)]
#[path = "../tests/overloads_tests.rs"]
mod tests;
