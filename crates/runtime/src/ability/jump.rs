//! Jump ability behavior.

use combat_core::CharacterId;

use crate::animation::{MeshId, Montage};

use super::{AbilityBehavior, AbilityContext};

/// Hold-to-jump: activation plays the jump montage on the character's main
/// mesh; releasing the input cancels the ability, which releases the mesh.
pub struct JumpAbility {
    mesh: MeshId,
    montage: Montage,
    jumping: bool,
}

impl JumpAbility {
    pub fn new(mesh: MeshId, montage: Montage) -> Self {
        Self {
            mesh,
            montage,
            jumping: false,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }
}

impl AbilityBehavior for JumpAbility {
    fn name(&self) -> &'static str {
        "jump"
    }

    fn can_activate(&self, _owner: CharacterId) -> bool {
        // Re-activating mid-jump is harmless but pointless.
        !self.jumping
    }

    fn activate(&mut self, ctx: &mut AbilityContext<'_>) -> bool {
        // A missing animator still lets the jump go through; the montage is
        // cosmetic to the jump itself.
        ctx.montages
            .play(self.mesh, ctx.ability, &self.montage, 1.0, None);
        self.jumping = true;
        true
    }

    fn on_input_released(&mut self, _ctx: &mut AbilityContext<'_>) -> bool {
        true
    }

    fn cancel(&mut self, ctx: &mut AbilityContext<'_>) {
        // Stopping when not jumping must stay harmless; cancel can race the
        // natural end of the montage.
        if self.jumping {
            ctx.montages
                .stop_if_current(self.mesh, self.montage.handle, None);
            self.jumping = false;
        }
    }
}
