//! Shared fixtures for reflector integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use reflector_core::{
    ClearColor, ColorEncoding, RenderHost, RenderState, RenderTargetDesc, ReflectorError,
    SurfaceId, Viewport,
};

/// Offscreen target handed out by [`MockHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockTarget {
    pub id: u32,
    pub desc: RenderTargetDesc,
}

/// A render host that records what the reflector does to it.
#[derive(Debug)]
pub struct MockHost {
    pub state: RenderState<MockTarget>,
    pub output_encoding: ColorEncoding,
    pub auto_clear: bool,
    pub viewport: Option<Viewport>,
    pub hidden: HashSet<SurfaceId>,
    pub allocations: Vec<RenderTargetDesc>,
    pub fail_allocation: bool,
    /// `(bound target id, clear colour)` for every clear.
    pub clears: Vec<(Option<u32>, ClearColor)>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            state: Self::initial_state(),
            output_encoding: ColorEncoding::Srgb,
            auto_clear: true,
            viewport: None,
            hidden: HashSet::new(),
            allocations: Vec::new(),
            fail_allocation: false,
            clears: Vec::new(),
        }
    }

    /// The state every test host starts with.
    pub fn initial_state() -> RenderState<MockTarget> {
        RenderState {
            target: None,
            clear_color: ClearColor::new(reflector_core::Vec3::new(0.2, 0.3, 0.4), 0.5),
            depth_write: false,
            shadow_auto_update: true,
            xr_enabled: true,
        }
    }

    /// Binds an offscreen target that is not owned by any reflector.
    pub fn bind_foreign_target(&mut self, encoding: ColorEncoding) {
        self.state.target = Some(MockTarget {
            id: 999,
            desc: RenderTargetDesc {
                width: 1920,
                height: 1080,
                encoding,
                generate_mipmaps: false,
            },
        });
    }
}

impl RenderHost for MockHost {
    type Target = MockTarget;

    fn render_state(&self) -> RenderState<MockTarget> {
        self.state.clone()
    }

    fn set_render_state(&mut self, state: RenderState<MockTarget>) {
        self.state = state;
    }

    fn output_encoding(&self) -> ColorEncoding {
        self.output_encoding
    }

    fn target_encoding(&self, target: &MockTarget) -> ColorEncoding {
        target.desc.encoding
    }

    fn create_render_target(
        &mut self,
        desc: &RenderTargetDesc,
    ) -> reflector_core::Result<MockTarget> {
        if self.fail_allocation {
            return Err(ReflectorError::AllocationFailed {
                width: desc.width,
                height: desc.height,
                reason: "mock out of memory".into(),
            });
        }
        self.allocations.push(desc.clone());
        Ok(MockTarget {
            id: u32::try_from(self.allocations.len()).unwrap_or(u32::MAX),
            desc: desc.clone(),
        })
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn clear(&mut self) {
        let bound = self.state.target.as_ref().map(|target| target.id);
        self.clears.push((bound, self.state.clear_color));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn is_surface_visible(&self, surface: SurfaceId) -> bool {
        !self.hidden.contains(&surface)
    }

    fn set_surface_visible(&mut self, surface: SurfaceId, visible: bool) {
        if visible {
            self.hidden.remove(&surface);
        } else {
            self.hidden.insert(surface);
        }
    }
}

/// Initializes logging once for the test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
