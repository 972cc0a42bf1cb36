//! Well-known tree keys the engine itself reads or writes.
//!
//! Every other key is opaque to the engine.

/// Device identifier. Stamped with a temporary value on first download.
pub const DEVICE_ID: &str = "deviceID";

/// Warehouse the device sells from.
pub const WAREHOUSE_ID: &str = "warehouseID";

/// Document serial numbers assigned to the device.
pub const SERIAL_NUMBERS: &str = "serialNumbers";

/// Whether electronic invoicing is enabled for the establishment.
pub const ELECTRONIC_INVOICING: &str = "electronicInvoicing";

/// Prefix of the provisional device identifier (`tmp-<unix millis>`).
pub const TEMP_DEVICE_ID_PREFIX: &str = "tmp-";
