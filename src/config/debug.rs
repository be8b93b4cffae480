//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet. Most call sites are further gated by `cfg(debug_assertions)`.

pub struct DebugFlags {
    /// Emit detailed cache serialization/deserialization logs.
    pub print_serde: bool,
    /// Emit a line every time a price provider fails and the next one is tried.
    pub print_provider_fallback: bool,
    /// Emit every computed weekday row as it leaves the engine.
    pub print_window_rows: bool,
    /// Emit per-page progress while paging through Binance klines.
    pub print_kline_pages: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_serde: false,
    print_provider_fallback: true,
    print_window_rows: false,
    print_kline_pages: false,
};
