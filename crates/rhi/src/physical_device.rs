//! Physical device (GPU) selection.
//!
//! A device qualifies when it:
//! 1. Exposes a graphics queue family and one that can present to the surface
//! 2. Supports `VK_KHR_swapchain`
//! 3. Reports Vulkan 1.3 with timeline semaphores and dynamic rendering
//!
//! Among qualifying devices discrete GPUs are preferred.

use ash::vk;
use tracing::{debug, info, warn};

use crate::error::{RhiError, RhiResult};

/// Queue family indices for the queues the renderer uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics_family: Option<u32>,
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// Unique family indices, graphics first.
    pub fn unique_families(&self) -> Vec<u32> {
        let mut families = Vec::with_capacity(2);

        if let Some(graphics) = self.graphics_family {
            families.push(graphics);
        }
        if let Some(present) = self.present_family
            && !families.contains(&present)
        {
            families.push(present);
        }

        families
    }
}

/// A selected GPU and the properties the rest of the backend needs.
#[derive(Clone)]
pub struct PhysicalDeviceInfo {
    pub device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_families: QueueFamilyIndices,
}

impl PhysicalDeviceInfo {
    pub fn device_name(&self) -> &str {
        self.properties
            .device_name_as_c_str()
            .ok()
            .and_then(|name| name.to_str().ok())
            .unwrap_or("Unknown Device")
    }

    pub fn device_type_name(&self) -> &'static str {
        device_type_name(self.properties.device_type)
    }

    /// Minimum alignment for uniform buffer offsets and sizes.
    pub fn min_uniform_buffer_alignment(&self) -> u64 {
        self.properties.limits.min_uniform_buffer_offset_alignment
    }

    pub fn device_local_memory(&self) -> u64 {
        self.memory_properties
            .memory_heaps
            .iter()
            .take(self.memory_properties.memory_heap_count as usize)
            .filter(|heap| heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL))
            .map(|heap| heap.size)
            .sum()
    }
}

impl std::fmt::Debug for PhysicalDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let version = self.properties.api_version;
        f.debug_struct("PhysicalDeviceInfo")
            .field("name", &self.device_name())
            .field("type", &self.device_type_name())
            .field(
                "api_version",
                &format!(
                    "{}.{}.{}",
                    vk::api_version_major(version),
                    vk::api_version_minor(version),
                    vk::api_version_patch(version)
                ),
            )
            .field("queue_families", &self.queue_families)
            .finish()
    }
}

fn device_type_name(device_type: vk::PhysicalDeviceType) -> &'static str {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => "Discrete GPU",
        vk::PhysicalDeviceType::INTEGRATED_GPU => "Integrated GPU",
        vk::PhysicalDeviceType::VIRTUAL_GPU => "Virtual GPU",
        vk::PhysicalDeviceType::CPU => "CPU",
        _ => "Other",
    }
}

/// Selects the most suitable physical device for presenting to `surface`.
///
/// # Errors
///
/// Returns [`RhiError::NoSuitableGpu`] if no device qualifies.
pub fn select_physical_device(
    instance: &ash::Instance,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> RhiResult<PhysicalDeviceInfo> {
    let devices = unsafe { instance.enumerate_physical_devices()? };

    if devices.is_empty() {
        warn!("No Vulkan-capable GPUs found");
        return Err(RhiError::NoSuitableGpu);
    }

    debug!("Found {} GPU(s)", devices.len());

    let selected = devices
        .into_iter()
        .filter_map(|device| check_device_suitability(instance, device, surface, surface_loader))
        .max_by_key(|info| {
            let score = rate_device(&info.properties);
            debug!(
                "GPU '{}' ({}) - Score: {}",
                info.device_name(),
                info.device_type_name(),
                score
            );
            score
        })
        .ok_or(RhiError::NoSuitableGpu)?;

    info!(
        "Selected GPU: '{}' ({}), {} MiB device-local",
        selected.device_name(),
        selected.device_type_name(),
        selected.device_local_memory() / (1024 * 1024)
    );

    Ok(selected)
}

fn check_device_suitability(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> Option<PhysicalDeviceInfo> {
    let properties = unsafe { instance.get_physical_device_properties(device) };
    let device_name = properties
        .device_name_as_c_str()
        .ok()
        .and_then(|name| name.to_str().ok())
        .unwrap_or("Unknown")
        .to_owned();

    if !supports_api_1_3(properties.api_version) {
        debug!(
            "GPU '{}' skipped: Vulkan 1.3 not supported (version: {}.{})",
            device_name,
            vk::api_version_major(properties.api_version),
            vk::api_version_minor(properties.api_version)
        );
        return None;
    }

    let queue_families = find_queue_families(instance, device, surface, surface_loader);
    if !queue_families.is_complete() {
        debug!(
            "GPU '{}' skipped: missing required queue families (graphics={}, present={})",
            device_name,
            queue_families.graphics_family.is_some(),
            queue_families.present_family.is_some()
        );
        return None;
    }

    if !supports_swapchain(instance, device) {
        debug!("GPU '{}' skipped: VK_KHR_swapchain not supported", device_name);
        return None;
    }

    let mut features_1_2 = vk::PhysicalDeviceVulkan12Features::default();
    let mut features_1_3 = vk::PhysicalDeviceVulkan13Features::default();
    let mut features = vk::PhysicalDeviceFeatures2::default()
        .push_next(&mut features_1_2)
        .push_next(&mut features_1_3);
    unsafe { instance.get_physical_device_features2(device, &mut features) };

    if features_1_2.timeline_semaphore == vk::FALSE || features_1_3.dynamic_rendering == vk::FALSE
    {
        debug!(
            "GPU '{}' skipped: timeline semaphores or dynamic rendering not supported",
            device_name
        );
        return None;
    }

    let memory_properties = unsafe { instance.get_physical_device_memory_properties(device) };

    Some(PhysicalDeviceInfo {
        device,
        properties,
        memory_properties,
        queue_families,
    })
}

fn supports_api_1_3(version: u32) -> bool {
    let major = vk::api_version_major(version);
    let minor = vk::api_version_minor(version);
    major > 1 || (major == 1 && minor >= 3)
}

fn supports_swapchain(instance: &ash::Instance, device: vk::PhysicalDevice) -> bool {
    let Ok(extensions) = (unsafe { instance.enumerate_device_extension_properties(device) })
    else {
        return false;
    };

    extensions.iter().any(|ext| {
        ext.extension_name_as_c_str()
            .is_ok_and(|name| name == ash::khr::swapchain::NAME)
    })
}

fn find_queue_families(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> QueueFamilyIndices {
    let queue_families = unsafe { instance.get_physical_device_queue_family_properties(device) };

    let mut indices = QueueFamilyIndices::default();

    for (i, family) in queue_families.iter().enumerate() {
        let i = i as u32;

        if family.queue_count == 0 {
            continue;
        }

        let has_graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
        let has_present = unsafe {
            surface_loader
                .get_physical_device_surface_support(device, i, surface)
                .unwrap_or(false)
        };

        // A family that does both avoids cross-queue ownership transfers.
        if has_graphics && has_present {
            indices.graphics_family = Some(i);
            indices.present_family = Some(i);
            break;
        }
        if has_graphics && indices.graphics_family.is_none() {
            indices.graphics_family = Some(i);
        }
        if has_present && indices.present_family.is_none() {
            indices.present_family = Some(i);
        }
    }

    indices
}

fn rate_device(properties: &vk::PhysicalDeviceProperties) -> u32 {
    let type_score = match properties.device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 10000,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 1000,
        vk::PhysicalDeviceType::VIRTUAL_GPU => 100,
        vk::PhysicalDeviceType::CPU => 10,
        _ => 1,
    };

    type_score + properties.limits.max_image_dimension2_d
}
