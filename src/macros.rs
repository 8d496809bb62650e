//! Logging shims
//!
//! Log lines go to defmt on target and to the `log` facade on the host,
//! so the control logic logs the same way in both builds.

macro_rules! link_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::info!($($arg)*);
        #[cfg(not(feature = "embedded"))]
        ::log::info!($($arg)*);
    }};
}

macro_rules! link_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::warn!($($arg)*);
        #[cfg(not(feature = "embedded"))]
        ::log::warn!($($arg)*);
    }};
}

macro_rules! link_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::error!($($arg)*);
        #[cfg(not(feature = "embedded"))]
        ::log::error!($($arg)*);
    }};
}

macro_rules! link_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::debug!($($arg)*);
        #[cfg(not(feature = "embedded"))]
        ::log::debug!($($arg)*);
    }};
}
