use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::types::Rgb8Image;

pub trait ImageWriter {
    fn write_rgb8(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()>;
}

impl<W: ImageWriter + ?Sized> ImageWriter for Box<W> {
    fn write_rgb8(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()> {
        (**self).write_rgb8(image, output)
    }
}
