//! Swapchain management.
//!
//! The swapchain is created once at a fixed size. The window is not
//! resizable, so there is no recreation path: an out-of-date swapchain is
//! reported as an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ash::vk;
use tracing::{debug, info, warn};

use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::instance::Instance;

/// Number of presentable images requested from the surface.
pub const BUFFER_COUNT: u32 = 2;

/// Swapchain surface support details.
#[derive(Debug, Clone)]
pub struct SwapchainSupportDetails {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupportDetails {
    pub fn query(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
    ) -> RhiResult<Self> {
        let capabilities = unsafe {
            surface_loader.get_physical_device_surface_capabilities(physical_device, surface)?
        };
        let formats = unsafe {
            surface_loader.get_physical_device_surface_formats(physical_device, surface)?
        };
        let present_modes = unsafe {
            surface_loader.get_physical_device_surface_present_modes(physical_device, surface)?
        };

        debug!(
            "Swapchain support: {} formats, {} present modes, image count: {}-{}",
            formats.len(),
            present_modes.len(),
            capabilities.min_image_count,
            capabilities.max_image_count
        );

        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    #[inline]
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Creation parameters for [`Swapchain`].
#[derive(Clone, Copy, Debug)]
pub struct SwapchainDesc {
    pub width: u32,
    pub height: u32,
    /// Requested image count; the surface may return more.
    pub image_count: u32,
    pub vsync: bool,
}

/// Vulkan swapchain with one image view per image.
pub struct Swapchain {
    device: Arc<Device>,
    swapchain_loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    format: vk::Format,
    extent: vk::Extent2D,
    present_mode: vk::PresentModeKHR,
    suboptimal: SuboptimalNotice,
}

/// Latches the first suboptimal report so the warning is logged once rather
/// than on every frame.
#[derive(Debug, Default)]
struct SuboptimalNotice(AtomicBool);

impl SuboptimalNotice {
    /// True only for the first call.
    fn first(&self) -> bool {
        !self.0.swap(true, Ordering::Relaxed)
    }

    fn report(&self, operation: &str) {
        if self.first() {
            warn!("Swapchain is suboptimal for the surface (reported by {})", operation);
        }
    }
}

impl Swapchain {
    /// Creates the swapchain.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface offers no formats or present modes,
    /// or if swapchain or image view creation fails.
    pub fn new(
        instance: &Instance,
        device: Arc<Device>,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
        desc: SwapchainDesc,
    ) -> RhiResult<Self> {
        let swapchain_loader = ash::khr::swapchain::Device::new(instance.handle(), device.handle());

        let support =
            SwapchainSupportDetails::query(device.physical_device(), surface, surface_loader)?;

        if !support.is_adequate() {
            return Err(RhiError::SwapchainError(
                "Inadequate swapchain support (no formats or present modes)".to_string(),
            ));
        }

        let surface_format = choose_surface_format(&support.formats);
        let present_mode = choose_present_mode(&support.present_modes, desc.vsync);
        let extent = choose_extent(&support.capabilities, desc.width, desc.height);
        let image_count = determine_image_count(&support.capabilities, desc.image_count);

        let queue_families = device.queue_families();
        let (Some(graphics_family), Some(present_family)) =
            (queue_families.graphics_family, queue_families.present_family)
        else {
            return Err(RhiError::SwapchainError("queue families incomplete".to_string()));
        };
        let queue_family_indices = [graphics_family, present_family];

        let (sharing_mode, queue_family_indices) = if graphics_family != present_family {
            (vk::SharingMode::CONCURRENT, queue_family_indices.as_slice())
        } else {
            (vk::SharingMode::EXCLUSIVE, &[][..])
        };

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(queue_family_indices)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true);

        let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None)? };

        let images = match unsafe { swapchain_loader.get_swapchain_images(swapchain) } {
            Ok(images) => images,
            Err(e) => {
                unsafe { swapchain_loader.destroy_swapchain(swapchain, None) };
                return Err(e.into());
            }
        };

        let image_views = match create_image_views(&device, &images, surface_format.format) {
            Ok(views) => views,
            Err(e) => {
                unsafe { swapchain_loader.destroy_swapchain(swapchain, None) };
                return Err(e);
            }
        };

        info!(
            "Swapchain created: {}x{}, format {:?}, present mode {:?}, {} images (requested {})",
            extent.width,
            extent.height,
            surface_format.format,
            present_mode,
            images.len(),
            desc.image_count
        );

        Ok(Self {
            device,
            swapchain_loader,
            swapchain,
            images,
            image_views,
            format: surface_format.format,
            extent,
            present_mode,
            suboptimal: SuboptimalNotice::default(),
        })
    }

    /// Asks the presentation engine which image to render into next.
    ///
    /// `semaphore` is signaled when the image may be written.
    pub fn acquire_next_image(&self, semaphore: vk::Semaphore) -> RhiResult<u32> {
        let result = unsafe {
            self.swapchain_loader
                .acquire_next_image(self.swapchain, u64::MAX, semaphore, vk::Fence::null())
        };

        match result {
            Ok((index, suboptimal)) => {
                if suboptimal {
                    self.suboptimal.report("acquire");
                }
                Ok(index)
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(RhiError::SwapchainError(
                "swapchain out of date while acquiring".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Queues `image_index` for presentation once `wait_semaphore` signals.
    pub fn present(
        &self,
        queue: vk::Queue,
        image_index: u32,
        wait_semaphore: vk::Semaphore,
    ) -> RhiResult<()> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [wait_semaphore];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.swapchain_loader.queue_present(queue, &present_info) } {
            Ok(false) => Ok(()),
            Ok(true) => {
                self.suboptimal.report("present");
                Ok(())
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(RhiError::SwapchainError(
                "swapchain out of date while presenting".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    #[inline]
    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    #[inline]
    pub fn image_count(&self) -> u32 {
        self.images.len() as u32
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn image(&self, index: usize) -> vk::Image {
        self.images[index]
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn image_view(&self, index: usize) -> vk::ImageView {
        self.image_views[index]
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            for &image_view in &self.image_views {
                self.device.handle().destroy_image_view(image_view, None);
            }
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }

        debug!(
            "Swapchain destroyed (was {}x{}, {} images)",
            self.extent.width,
            self.extent.height,
            self.images.len()
        );
    }
}

/// Prefers B8G8R8A8_SRGB, then B8G8R8A8_UNORM, then whatever comes first.
fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    let find = |format: vk::Format| {
        formats
            .iter()
            .find(|f| f.format == format && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR)
            .copied()
    };

    if let Some(format) = find(vk::Format::B8G8R8A8_SRGB) {
        return format;
    }
    if let Some(format) = find(vk::Format::B8G8R8A8_UNORM) {
        warn!("Using fallback surface format: B8G8R8A8_UNORM with SRGB_NONLINEAR");
        return format;
    }

    warn!("Using first available surface format: {:?}", formats[0].format);
    formats[0]
}

/// FIFO when vsync is on. Otherwise MAILBOX, then IMMEDIATE, then FIFO.
fn choose_present_mode(present_modes: &[vk::PresentModeKHR], vsync: bool) -> vk::PresentModeKHR {
    if !vsync {
        for mode in [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE] {
            if present_modes.contains(&mode) {
                return mode;
            }
        }
        debug!("No tearing-free low latency mode available, using FIFO");
    }

    // Always supported
    vk::PresentModeKHR::FIFO
}

/// Uses the surface's current extent when it has one, else clamps the request.
fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// Clamps the requested image count to what the surface allows.
/// A `max_image_count` of zero means unbounded.
fn determine_image_count(capabilities: &vk::SurfaceCapabilitiesKHR, requested: u32) -> u32 {
    let count = requested.max(capabilities.min_image_count);
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

fn create_image_views(
    device: &Device,
    images: &[vk::Image],
    format: vk::Format,
) -> RhiResult<Vec<vk::ImageView>> {
    let mut image_views = Vec::with_capacity(images.len());

    for (i, &image) in images.iter().enumerate() {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .level_count(1)
                    .layer_count(1),
            );

        match unsafe { device.handle().create_image_view(&create_info, None) } {
            Ok(view) => image_views.push(view),
            Err(e) => {
                for view in image_views {
                    unsafe { device.handle().destroy_image_view(view, None) };
                }
                return Err(RhiError::SwapchainError(format!(
                    "Failed to create image view {i}: {e:?}"
                )));
            }
        }
    }

    Ok(image_views)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }
    }

    #[test]
    fn test_suboptimal_notice_fires_once() {
        let notice = SuboptimalNotice::default();
        assert!(notice.first());
        assert!(!notice.first());
        notice.report("present");
        assert!(!notice.first());
    }

    #[test]
    fn test_choose_surface_format_prefers_srgb() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM),
            format(vk::Format::B8G8R8A8_SRGB),
            format(vk::Format::B8G8R8A8_UNORM),
        ];
        assert_eq!(
            choose_surface_format(&formats).format,
            vk::Format::B8G8R8A8_SRGB
        );
    }

    #[test]
    fn test_choose_surface_format_fallback() {
        let formats = [format(vk::Format::R8G8B8A8_UNORM)];
        assert_eq!(
            choose_surface_format(&formats).format,
            vk::Format::R8G8B8A8_UNORM
        );
    }

    #[test]
    fn test_vsync_forces_fifo() {
        let modes = [
            vk::PresentModeKHR::IMMEDIATE,
            vk::PresentModeKHR::MAILBOX,
            vk::PresentModeKHR::FIFO,
        ];
        assert_eq!(choose_present_mode(&modes, true), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn test_no_vsync_prefers_mailbox_then_immediate() {
        let modes = [
            vk::PresentModeKHR::FIFO,
            vk::PresentModeKHR::IMMEDIATE,
            vk::PresentModeKHR::MAILBOX,
        ];
        assert_eq!(choose_present_mode(&modes, false), vk::PresentModeKHR::MAILBOX);

        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(choose_present_mode(&modes, false), vk::PresentModeKHR::IMMEDIATE);

        let modes = [vk::PresentModeKHR::FIFO];
        assert_eq!(choose_present_mode(&modes, false), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn test_choose_extent_uses_current() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1920,
                height: 1080,
            },
            ..Default::default()
        };
        let extent = choose_extent(&capabilities, 800, 600);
        assert_eq!((extent.width, extent.height), (1920, 1080));
    }

    #[test]
    fn test_choose_extent_clamps_to_limits() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 100,
                height: 100,
            },
            max_image_extent: vk::Extent2D {
                width: 2000,
                height: 2000,
            },
            ..Default::default()
        };

        let extent = choose_extent(&capabilities, 3000, 50);
        assert_eq!((extent.width, extent.height), (2000, 100));

        let extent = choose_extent(&capabilities, 800, 600);
        assert_eq!((extent.width, extent.height), (800, 600));
    }

    #[test]
    fn test_image_count_honours_request_within_limits() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capabilities, BUFFER_COUNT), 2);

        // Surface demands at least three
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capabilities, BUFFER_COUNT), 3);

        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 1,
            max_image_count: 1,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capabilities, BUFFER_COUNT), 1);
    }

    #[test]
    fn test_swapchain_support_details_is_adequate() {
        let adequate = SwapchainSupportDetails {
            capabilities: vk::SurfaceCapabilitiesKHR::default(),
            formats: vec![vk::SurfaceFormatKHR::default()],
            present_modes: vec![vk::PresentModeKHR::FIFO],
        };
        assert!(adequate.is_adequate());

        let no_modes = SwapchainSupportDetails {
            present_modes: vec![],
            ..adequate.clone()
        };
        assert!(!no_modes.is_adequate());
    }
}
