/// The stage a dispatched request has reached.
///
/// Ordinary requests move `Received -> Delegated` and are then owned by the
/// delegate. Raw requests walk the dial/write/read sequence and always end
/// in `RawDone` or `Failed`, with the connection closed either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPhase {
    /// The request has been accepted but not yet routed.
    #[default]
    Received,

    /// The request was handed to the standard delegate.
    Delegated,

    /// Dialing a fresh connection for a raw exchange.
    RawDialing,

    /// Writing the caller's bytes to the wire.
    RawWriting,

    /// Reading and framing the raw response.
    RawReading,

    /// The raw exchange completed; the connection is closed.
    RawDone,

    /// The exchange failed; any connection has been torn down.
    Failed,
}

impl DispatchPhase {
    /// Whether this phase is terminal for the dispatch layer.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delegated | Self::RawDone | Self::Failed)
    }
}
