use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::BayerGrid;

pub trait RawFrameReader {
    fn read_raw(&self, data: &[u8]) -> Result<BayerGrid>;
}
