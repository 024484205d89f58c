use imagec_core_geometry::{label_components, trace_outer_contour, Connectivity};
use imagec_domain_commands::ExecutionContext;
use imagec_domain_model::{BinaryMask, Intermediate, Object, Validity};

/// Connected-component connectivity used by the executor's own
/// `Binary` → `Objects` conversion. The command library exposes no setting
/// for this, so it is fixed at eight-connectivity (the more permissive
/// choice, matching how the Morphology and Object-filter commands already
/// treat diagonally touching pixels as one blob).
const CONNECTIVITY: Connectivity = Connectivity::Eight;

/// Performs the conversion the executor itself owns (§4.3): once a
/// segmentation command has left a `BinaryMask` in the slot and the next
/// command in the chain declares an `Objects` input, the mask is labeled
/// into connected components, each becomes one `Object` with its contour
/// traced and coordinates translated from tile-local to full-image space,
/// and object ids are minted monotonically from `ctx`'s counter.
pub fn binary_to_objects(ctx: &mut ExecutionContext<'_>) {
    let BinaryMask { mask, origin } = match &ctx.slot {
        Intermediate::Binary(binary) => binary.clone(),
        _ => return,
    };

    let components = label_components(&mask, CONNECTIVITY);
    let mut objects = Vec::with_capacity(components.len());
    for component in components {
        let bounding_box = component.bounding_box.translated(origin.0, origin.1);
        let contour_local = trace_outer_contour(&component.mask);
        let contour = contour_local
            .into_iter()
            .map(|(x, y)| (x + bounding_box.x as i32, y + bounding_box.y as i32))
            .collect();

        let object_id = ctx.allocate_object_id();
        objects.push(Object {
            class: ctx.default_class,
            object_id,
            origin_object_id: object_id,
            parent_object_id: None,
            tracking_id: None,
            plane: ctx.plane,
            tile: ctx.tile,
            bounding_box,
            mask: component.mask,
            contour,
            confidence: 1.0,
            validity: Validity::empty(),
            intensity_by_channel: Default::default(),
            intersecting_by_class: Default::default(),
            distance_by_class: Default::default(),
        });
    }

    ctx.slot = Intermediate::Objects(objects);
}
