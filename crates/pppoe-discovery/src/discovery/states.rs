/// Client-side discovery progress (RFC 2516, Section 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// No discovery traffic exchanged yet.
    Initial,
    /// PADI broadcast; collecting offers.
    SentPadi,
    /// An acceptable PADO committed a peer.
    ReceivedPado,
    /// PADR sent to the selected concentrator.
    SentPadr,
    /// PADS accepted; the session id is valid.
    Session,
}

/// The phase a discovery timeout surfaced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPhase {
    /// PADI sent, no acceptable PADO arrived.
    Pado,
    /// PADR sent, no acceptable PADS arrived.
    Pads,
}
