//! Vulkan instance management.
//!
//! Creates the `VkInstance` with the surface extensions the windowing
//! system needs and, when requested and installed, the Khronos validation
//! layer with its messages forwarded into `tracing`.
//!
//! # Example
//!
//! ```no_run
//! use triframe_rhi::instance::Instance;
//!
//! // Headless instance, validation in debug builds
//! let instance = Instance::new(None, cfg!(debug_assertions)).expect("Failed to create Vulkan instance");
//! assert!(instance.api_version() >= ash::vk::API_VERSION_1_3);
//! ```

use std::ffi::{CStr, c_char};

use ash::{Entry, vk};
use raw_window_handle::RawDisplayHandle;
use tracing::{debug, error, info, trace, warn};

use crate::error::{RhiError, RhiResult};

const VALIDATION_LAYER_NAME: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Vulkan instance with an optional debug messenger.
pub struct Instance {
    entry: Entry,
    instance: ash::Instance,
    debug_utils: Option<ash::ext::debug_utils::Instance>,
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl Instance {
    /// Vulkan 1.3 for dynamic rendering and core timeline semaphores.
    const API_VERSION: u32 = vk::API_VERSION_1_3;

    /// Creates a new Vulkan instance.
    ///
    /// With a display handle the platform surface extensions are enabled.
    /// Without one the instance is headless.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader cannot be found, the driver does not
    /// support the surface extensions, or instance creation fails.
    pub fn new(display: Option<RawDisplayHandle>, enable_validation: bool) -> RhiResult<Self> {
        let entry = unsafe { Entry::load()? };

        let validation_available =
            enable_validation && Self::is_validation_layer_available(&entry)?;
        if enable_validation && !validation_available {
            warn!("Validation layer requested but not available, proceeding without it");
        }

        let app_info = vk::ApplicationInfo::default()
            .application_name(c"triframe")
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(c"triframe")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(Self::API_VERSION);

        let mut extensions = Self::required_extensions(display)?;
        if validation_available {
            extensions.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        let layers = if validation_available {
            vec![VALIDATION_LAYER_NAME.as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);

        let instance = unsafe { entry.create_instance(&create_info, None)? };

        info!(
            extensions = extensions.len(),
            validation = validation_available,
            "Vulkan instance created"
        );

        let (debug_utils, debug_messenger) = if validation_available {
            let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);
            match Self::setup_debug_messenger(&debug_utils) {
                Ok(messenger) => (Some(debug_utils), Some(messenger)),
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e);
                }
            }
        } else {
            (None, None)
        };

        Ok(Self {
            entry,
            instance,
            debug_utils,
            debug_messenger,
        })
    }

    #[inline]
    pub fn handle(&self) -> &ash::Instance {
        &self.instance
    }

    #[inline]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    #[inline]
    pub fn api_version(&self) -> u32 {
        Self::API_VERSION
    }

    /// Returns whether the debug messenger is installed.
    #[inline]
    pub fn has_validation(&self) -> bool {
        self.debug_messenger.is_some()
    }

    fn required_extensions(display: Option<RawDisplayHandle>) -> RhiResult<Vec<*const c_char>> {
        let Some(display) = display else {
            return Ok(Vec::new());
        };

        let extensions = ash_window::enumerate_required_extensions(display)
            .map_err(|e| RhiError::SurfaceError(format!("unsupported display: {e}")))?;

        Ok(extensions.to_vec())
    }

    fn is_validation_layer_available(entry: &Entry) -> RhiResult<bool> {
        let available_layers = unsafe { entry.enumerate_instance_layer_properties()? };

        Ok(available_layers.iter().any(|layer| {
            layer
                .layer_name_as_c_str()
                .is_ok_and(|name| name == VALIDATION_LAYER_NAME)
        }))
    }

    fn setup_debug_messenger(
        debug_utils: &ash::ext::debug_utils::Instance,
    ) -> RhiResult<vk::DebugUtilsMessengerEXT> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None)? };
        debug!("Debug messenger created");

        Ok(messenger)
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe {
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils, self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
        debug!("Vulkan instance destroyed");
    }
}

/// Forwards validation layer messages into `tracing` at matching severity.
///
/// # Safety
///
/// Called by the Vulkan loader with a valid (or null) callback data pointer.
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = unsafe { &*p_callback_data };
    let message = if callback_data.p_message.is_null() {
        std::borrow::Cow::Borrowed("(no message)")
    } else {
        unsafe { CStr::from_ptr(callback_data.p_message).to_string_lossy() }
    };

    let kind = match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL => "general",
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => "validation",
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => "performance",
        _ => "other",
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => error!(target: "vulkan", kind, "{message}"),
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => warn!(target: "vulkan", kind, "{message}"),
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => debug!(target: "vulkan", kind, "{message}"),
        _ => trace!(target: "vulkan", kind, "{message}"),
    }

    vk::FALSE
}

/// Returns true for errors that mean no usable Vulkan driver is installed.
#[cfg(test)]
pub(crate) fn is_driver_missing(error: &RhiError) -> bool {
    matches!(
        error,
        RhiError::LoadingError(_)
            | RhiError::VulkanError(
                vk::Result::ERROR_INCOMPATIBLE_DRIVER
                    | vk::Result::ERROR_INITIALIZATION_FAILED
                    | vk::Result::ERROR_LAYER_NOT_PRESENT
            )
    )
}
