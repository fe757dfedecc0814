//! Screenshot capture and file download

use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::controller::ActionController;
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::waits::WaitCondition;

impl ActionController {
    /// Capture the visible page and persist it, returning the artifact path
    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn take_screenshot(&self) -> Result<PathBuf> {
        let png = self.session()?.driver().screenshot().await?;
        let path = self.files().create_screenshot_file(&png).await?;
        self.files().report_screenshot(&path).await?;
        Ok(path)
    }

    /// Capture the page and crop it to the element's bounding box.
    ///
    /// An element at (x, y) sized w×h yields exactly a w×h image; an element
    /// extending past the captured page fails rather than silently clipping.
    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn screenshot_element(&self, locator: &Locator) -> Result<PathBuf> {
        let (session, handle) = self.resolve(locator, WaitCondition::Visibility).await?;
        let driver = session.driver();

        let location = driver.location(&handle).await?;
        let size = driver.size(&handle).await?;
        let png = driver.screenshot().await?;

        let page = image::load_from_memory(&png)
            .map_err(|e| Error::image(format!("screenshot decode: {}", e)))?;

        if location.x < 0 || location.y < 0 {
            return Err(Error::image(format!(
                "element at ({}, {}) lies outside the capture",
                location.x, location.y
            )));
        }
        let (x, y) = (location.x as u32, location.y as u32);
        let (w, h) = (size.width as u32, size.height as u32);
        if x + w > page.width() || y + h > page.height() {
            return Err(Error::image(format!(
                "element {}x{} at ({}, {}) exceeds {}x{} capture",
                w,
                h,
                x,
                y,
                page.width(),
                page.height()
            )));
        }

        debug!(%locator, w, h, "cropping element screenshot");
        let cropped = page.crop_imm(x, y, w, h);
        let mut bytes = Vec::new();
        cropped
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .map_err(|e| Error::image(format!("screenshot encode: {}", e)))?;

        let path = self.files().create_screenshot_file(&bytes).await?;
        self.files().report_screenshot(&path).await?;
        Ok(path)
    }

    /// Fetch `url` into the artifact store
    pub async fn download_file(
        &self,
        url: &str,
        prefix: &str,
        extension: &str,
    ) -> Result<PathBuf> {
        self.files().download_file(url, prefix, extension).await
    }
}
