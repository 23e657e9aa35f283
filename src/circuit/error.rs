/// Errors raised while assembling, instantiating or linking circuits.
///
/// All of them describe a malformed blueprint or a misuse of the build
/// protocol; none is transient.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A placement lists a different number of nets than the child declares
    #[error("{child}: placement has {actual} {port} nets, prototype declares {expected}")]
    ArityMismatch {
        child: String,
        port: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Two producers claim the same net name inside one scope
    #[error("{scope}: net `{net}` is produced more than once")]
    DuplicateNet { scope: String, net: String },
    /// A placement consumes a net nothing in the scope produces
    #[error("{scope}: net `{net}` is not produced in this scope")]
    UnknownNet { scope: String, net: String },
    /// An outer output port names a net that is never driven
    #[error("{scope}: output port `{net}` is not driven by any placement or input")]
    UndrivenOutput { scope: String, net: String },
    /// `link` got the wrong number of external inputs
    #[error("{scope}: expected {expected} inputs to link, got {actual}")]
    InputCount {
        scope: String,
        expected: usize,
        actual: usize,
    },
    #[error("{scope}: circuit is already linked")]
    AlreadyLinked { scope: String },
    #[error("{scope}: output index {index} out of range, prototype has {outputs} outputs")]
    OutputIndex {
        scope: String,
        index: usize,
        outputs: usize,
    },
    /// A composite with an input wired straight to an output was placed as a child
    #[error("{child}: output `{net}` passes an input straight through and cannot be nested")]
    PassThroughChild { child: String, net: String },
    /// The output port is bound to an outer input that only exists once linked
    #[error("{scope}: output `{net}` is not bound until the circuit is linked")]
    OutputNotReady { scope: String, net: String },
    #[error("combinational loop through gate `{gate}`, every cycle needs a register")]
    CombinationalLoop { gate: String },
}
pub type CircuitError = Error;
