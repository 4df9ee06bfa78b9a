//! OGC web service dispatch and capabilities helpers.
//!
//! Provides:
//! - Request routing across the compiled-in protocol handlers
//! - Layer name resolution, online resource resolution
//! - Metadata, list and bounding-box formatters used by capabilities documents
//! - WMS 1.1.1 and WFS 1.0.0 GetCapabilities handlers (cargo features `wms`, `wfs`)

pub mod bbox;
pub mod dispatch;
pub mod exceptions;
pub mod extent;
pub mod html;
pub mod online_resource;
pub mod print;
pub mod request;
pub mod unique;

#[cfg(feature = "wfs")]
pub mod wfs;
#[cfg(feature = "wms")]
pub mod wms;

pub use bbox::{format_g, print_bounding_box, print_latlon_bounding_box};
pub use dispatch::{DispatchContext, DispatchStatus, OwsDispatcher, ServiceHandler};
pub use extent::{get_layer_extent, DataSource, NoDataSource};
pub use html::encode_html_entities;
pub use online_resource::{get_online_resource, RequestContext};
pub use print::{
    print_encoded_group_metadata, print_encoded_metadata, print_encoded_metadata_list,
    print_encoded_param, print_group_metadata, print_metadata, print_metadata_list,
    print_param, MissingAction, PrintStatus,
};
pub use request::{OwsRequest, OwsResponse};
pub use unique::make_all_layers_unique;

#[cfg(feature = "wfs")]
pub use wfs::WfsHandler;
#[cfg(feature = "wms")]
pub use wms::WmsHandler;
