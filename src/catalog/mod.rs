use crate::models::SeedPlace;

/// Landmarks loaded into an empty place repository at startup
pub const BUILTIN_CATALOG: &[SeedPlace] = &[
    SeedPlace {
        name: "Eiffel Tower",
        latitude: 48.8584,
        longitude: 2.2945,
        image_name: "eiffel",
    },
    SeedPlace {
        name: "Statue of Liberty",
        latitude: 40.6892,
        longitude: -74.0445,
        image_name: "liberty",
    },
    SeedPlace {
        name: "Colosseum",
        latitude: 41.8902,
        longitude: 12.4922,
        image_name: "colosseum",
    },
    SeedPlace {
        name: "Big Ben",
        latitude: 51.5007,
        longitude: -0.1246,
        image_name: "bigben",
    },
    SeedPlace {
        name: "Great Wall of China",
        latitude: 40.4319,
        longitude: 116.5704,
        image_name: "greatwall",
    },
    SeedPlace {
        name: "Sydney Opera House",
        latitude: -33.8568,
        longitude: 151.2153,
        image_name: "sydneyopera",
    },
    SeedPlace {
        name: "Taj Mahal",
        latitude: 27.1751,
        longitude: 78.0421,
        image_name: "tajmahal",
    },
    SeedPlace {
        name: "Christ the Redeemer",
        latitude: -22.9519,
        longitude: -43.2105,
        image_name: "christredeemer",
    },
    SeedPlace {
        name: "Machu Picchu",
        latitude: -13.1631,
        longitude: -72.5450,
        image_name: "machupicchu",
    },
    SeedPlace {
        name: "Mount Fuji",
        latitude: 35.3606,
        longitude: 138.7274,
        image_name: "mountfuji",
    },
];
