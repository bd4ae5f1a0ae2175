use env_param::EnvParam;

/// Hard resource bounds (spec §5). Exposed as `EnvParam`s so a driver can
/// tune them without a rebuild, the way `aries::solver::solver_impl` exposes
/// e.g. `ARIES_DYNAMIC_EDGES` — only read lazily, on first access.
static MAX_STEPS: EnvParam<u64> = EnvParam::new("SYMEX_MAX_STEPS", "10000");
static MAX_EXEC_PROGRAM_POINT: EnvParam<u32> = EnvParam::new("SYMEX_MAX_EXEC_PROGRAM_POINT", "2");
static TOO_BIG_CONSTRAINTS_THRESHOLD: EnvParam<usize> = EnvParam::new("SYMEX_TOO_BIG_CONSTRAINTS_THRESHOLD", "75");

/// The nullable-annotation names recognised when fanning out starting
/// states (spec §6). Configurable; this is the default set.
pub const DEFAULT_NULLABLE_ANNOTATIONS: &[&str] = &["javax.annotation.CheckForNull", "javax.annotation.Nullable"];

/// Tunable limits and options for one [crate::walker::Walker]. Constructed
/// with `Default` for the literal spec values, or `EngineConfig::from_env`
/// to pick up `SYMEX_*` environment overrides.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_steps: u64,
    pub max_exec_program_point: u32,
    pub too_big_constraints_threshold: usize,
    pub nullable_annotations: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_steps: 10_000,
            max_exec_program_point: 2,
            too_big_constraints_threshold: 75,
            nullable_annotations: DEFAULT_NULLABLE_ANNOTATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    /// Reads `SYMEX_MAX_STEPS`, `SYMEX_MAX_EXEC_PROGRAM_POINT` and
    /// `SYMEX_TOO_BIG_CONSTRAINTS_THRESHOLD` from the environment, falling
    /// back to the spec defaults for anything unset or unparsable. The
    /// nullable-annotation set is not environment-configurable; build it
    /// with `Default` and override `nullable_annotations` directly.
    pub fn from_env() -> Self {
        EngineConfig {
            max_steps: MAX_STEPS.get(),
            max_exec_program_point: MAX_EXEC_PROGRAM_POINT.get(),
            too_big_constraints_threshold: TOO_BIG_CONSTRAINTS_THRESHOLD.get(),
            ..Default::default()
        }
    }
}
